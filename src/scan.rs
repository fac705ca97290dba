//! Reachability pre-pass.
//!
//! Walks the whole input once and records every identity that can be reached
//! through more than one reference occurrence, cycles included. Descent stops
//! the second time an identity is met, so the walk is linear in the number of
//! distinct reachable objects rather than in the number of paths.

use std::collections::HashSet;

use crate::identity::{identity_of, Identity};
use crate::value::Value;

/// Identities reachable through two or more reference occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReusedSet {
    ids: HashSet<Identity>,
}

impl ReusedSet {
    pub fn contains(&self, id: Identity) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.ids.iter()
    }
}

/// Classify every identity reachable from `values`.
///
/// All arguments of one call are scanned together, so sharing between
/// arguments is detected as well. The scan never mutates the graph.
pub fn scan(values: &[Value]) -> ReusedSet {
    let scanner = Scanner::walk(values);
    tracing::debug!(
        distinct = scanner.seen_once.len() + scanner.reused.len(),
        reused = scanner.reused.len(),
        "scanned value graph"
    );

    let reused = ReusedSet {
        ids: scanner.reused,
    };
    for id in reused.iter() {
        tracing::trace!(identity = %id, "reused identity");
    }
    reused
}

/// [`scan`] without the summary events, for the sessions that order map keys.
pub(crate) fn scan_quiet(values: &[Value]) -> ReusedSet {
    ReusedSet {
        ids: Scanner::walk(values).reused,
    }
}

#[derive(Default)]
struct Scanner {
    seen_once: HashSet<Identity>,
    reused: HashSet<Identity>,
}

impl Scanner {
    fn walk(values: &[Value]) -> Self {
        let mut scanner = Scanner::default();
        for value in values {
            scanner.visit(value);
        }
        scanner
    }

    fn visit(&mut self, value: &Value) {
        if let Some(id) = identity_of(value) {
            if self.reused.contains(&id) {
                return;
            }
            if self.seen_once.remove(&id) {
                // Everything below was visited the first time round.
                self.reused.insert(id);
                return;
            }
            self.seen_once.insert(id);
        }

        match value {
            Value::List(list) => {
                for item in list.iter() {
                    self.visit(item);
                }
            }
            Value::Array(array) => {
                for item in &array.items {
                    self.visit(item);
                }
            }
            Value::Dyn(Some(inner)) => self.visit(inner),
            Value::Ref(r) => {
                // A cell that is mutably borrowed right now cannot be observed.
                if let Some(target) = r.target.as_ref().and_then(|cell| cell.try_borrow().ok()) {
                    self.visit(&target);
                }
            }
            Value::Map(map) => {
                // Keys are rendered in the same session as values.
                for (key, entry) in map.iter() {
                    self.visit(key);
                    self.visit(entry);
                }
            }
            Value::Record(record) => {
                // Hidden fields still count: sharing must be detected on the
                // true shape of the graph.
                for field in &record.fields {
                    self.visit(&field.value);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Field, Ref};

    #[test]
    fn test_unique_references_not_reused() {
        let values = vec![
            Value::reference("int", Value::Int(1)),
            Value::reference("int", Value::Int(1)),
        ];
        assert!(scan(&values).is_empty());
    }

    #[test]
    fn test_siblings_reused() {
        let shared = Value::reference("int", Value::Int(1));
        let list = Value::list("*int", vec![shared.clone(), shared.clone()]);
        let reused = scan(&[list]);
        assert_eq!(reused.len(), 1);
        assert!(reused.contains(identity_of(&shared).unwrap()));
    }

    #[test]
    fn test_sharing_across_arguments() {
        let shared = Value::reference("int", Value::Int(1));
        let reused = scan(&[shared.clone(), shared.clone()]);
        assert!(reused.contains(identity_of(&shared).unwrap()));
    }

    #[test]
    fn test_self_cycle() {
        let node = Ref::new("Node", Value::nil());
        node.set(Value::record("Node", vec![Field::public("Next", Value::Ref(node.clone()))]));
        let reused = scan(&[Value::Ref(node.clone())]);
        assert_eq!(reused.len(), 1);
        assert!(reused.contains(identity_of(&Value::Ref(node)).unwrap()));
    }

    #[test]
    fn test_long_cycle_only_entry_reused() {
        let a = Ref::new("Node", Value::nil());
        let b = Ref::new("Node", Value::nil());
        let c = Ref::new("Node", Value::nil());
        a.set(Value::record("Node", vec![Field::public("Next", Value::Ref(b.clone()))]));
        b.set(Value::record("Node", vec![Field::public("Next", Value::Ref(c.clone()))]));
        c.set(Value::record("Node", vec![Field::public("Next", Value::Ref(a.clone()))]));

        let reused = scan(&[Value::Ref(a.clone())]);
        assert_eq!(reused.len(), 1);
        assert!(reused.contains(identity_of(&Value::Ref(a)).unwrap()));
    }

    #[test]
    fn test_private_fields_scanned() {
        let shared = Value::reference("int", Value::Int(7));
        let record = Value::record(
            "T",
            vec![Field::public("A", shared.clone()), Field::private("b", shared.clone())],
        );
        assert!(scan(&[record]).contains(identity_of(&shared).unwrap()));
    }

    #[test]
    fn test_map_keys_and_values_scanned() {
        let shared = Value::reference("int", Value::Int(7));
        let map = Value::map(
            "*int",
            "*int",
            vec![
                (shared.clone(), Value::reference("int", Value::Int(1))),
                (Value::reference("int", Value::Int(2)), shared.clone()),
            ],
        );
        let reused = scan(&[map]);
        assert_eq!(reused.len(), 1);
        assert!(reused.contains(identity_of(&shared).unwrap()));

        let map = Value::map("string", "*int", vec![
            (Value::str("a"), shared.clone()),
            (Value::str("b"), shared.clone()),
        ]);
        assert!(scan(&[map]).contains(identity_of(&shared).unwrap()));
    }

    #[test]
    fn test_cycle_through_map_key() {
        let key = Ref::new("app.Node", Value::nil());
        let map = Value::map("*app.Node", "int", vec![(Value::Ref(key.clone()), Value::Int(1))]);
        key.set(Value::record("app.Node", vec![Field::public("M", map.clone())]));

        let reused = scan(&[map.clone()]);
        assert_eq!(reused.len(), 1);
        assert!(reused.contains(identity_of(&map).unwrap()));
        assert_eq!(scan_quiet(&[map.clone()]), reused);
    }

    #[test]
    fn test_wrapper_unwrapped() {
        let shared = Value::reference("int", Value::Int(7));
        let list = Value::list(
            "interface {}",
            vec![Value::dynamic(shared.clone()), Value::dynamic(shared.clone())],
        );
        assert!(scan(&[list]).contains(identity_of(&shared).unwrap()));
    }

    #[test]
    fn test_diamond_counts_once() {
        let leaf = Value::reference("int", Value::Int(7));
        let left = Value::reference("Box", Value::record("Box", vec![Field::public("V", leaf.clone())]));
        let right = Value::reference("Box", Value::record("Box", vec![Field::public("V", leaf.clone())]));
        let reused = scan(&[Value::list("*Box", vec![left.clone(), right.clone()])]);
        assert_eq!(reused.len(), 1);
        assert!(reused.contains(identity_of(&leaf).unwrap()));
    }
}
