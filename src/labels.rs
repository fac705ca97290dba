//! Per-session aliases for reused identities.

use std::collections::HashMap;
use std::fmt;

use crate::identity::Identity;
use crate::scan::ReusedSet;

/// Short alias of a reused identity: `p0`, `p1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Hands out labels in the order identities are first met while rendering.
///
/// Only identities in the [`ReusedSet`] get labels; everything else is
/// rendered inline without alias machinery.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    reused: ReusedSet,
    assigned: HashMap<Identity, Label>,
}

impl LabelRegistry {
    pub fn new(reused: ReusedSet) -> Self {
        Self {
            reused,
            assigned: HashMap::new(),
        }
    }

    /// The label for `id` and whether this is its first visit.
    ///
    /// Returns `None` when `id` is not reused. The first call for a reused
    /// identity allocates the next label and reports `true`; later calls
    /// return the same label with `false`.
    pub fn label_for(&mut self, id: Identity) -> Option<(Label, bool)> {
        if !self.reused.contains(id) {
            return None;
        }
        if let Some(label) = self.assigned.get(&id) {
            return Some((*label, false));
        }
        let label = Label(self.assigned.len());
        self.assigned.insert(id, label);
        Some((label, true))
    }

    /// Number of labels handed out so far.
    pub fn assigned(&self) -> usize {
        self.assigned.len()
    }
}
