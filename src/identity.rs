//! Identity tokens for reference-bearing values.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Address-equivalent token of a value's backing storage.
///
/// Two values with the same identity share storage. Tokens are only
/// meaningful while the graph they came from is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        Identity(Rc::as_ptr(rc) as *const () as usize)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The identity of `value`, if it is a non-nil reference.
///
/// Scalars, records, arrays, functions, channels and times have none, and
/// neither does a wrapper itself: callers unwrap [`Value::Dyn`] first. Empty
/// lists and maps have none either, since there is no body to alias.
pub fn identity_of(value: &Value) -> Option<Identity> {
    match value {
        Value::Ref(r) => r.target.as_ref().map(Identity::of_rc),
        Value::List(list) => list
            .items
            .as_ref()
            .filter(|items| !items.is_empty())
            .map(Identity::of_rc),
        Value::Map(map) => map
            .entries
            .as_ref()
            .filter(|entries| !entries.is_empty())
            .map(Identity::of_rc),
        Value::Custom(custom) => Some(Identity::of_rc(&custom.dumper)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{List, Map, Ref};

    #[test]
    fn test_shared_storage_same_identity() {
        let value = Value::reference("int", Value::Int(1));
        let copy = value.clone();
        assert_eq!(identity_of(&value), identity_of(&copy));
        assert!(identity_of(&value).is_some());
    }

    #[test]
    fn test_distinct_storage_distinct_identity() {
        let a = Value::reference("int", Value::Int(1));
        let b = Value::reference("int", Value::Int(1));
        assert_ne!(identity_of(&a), identity_of(&b));
    }

    #[test]
    fn test_no_identity() {
        assert_eq!(identity_of(&Value::Int(1)), None);
        assert_eq!(identity_of(&Value::str("x")), None);
        assert_eq!(identity_of(&Value::array("int", vec![Value::Int(1)])), None);
        assert_eq!(identity_of(&Value::record("T", vec![])), None);
        assert_eq!(identity_of(&Value::Ref(Ref::nil("T"))), None);
        assert_eq!(identity_of(&Value::List(List::nil("int"))), None);
        assert_eq!(identity_of(&Value::Map(Map::nil("int", "int"))), None);
        assert_eq!(identity_of(&Value::list("int", vec![])), None);
    }

    #[test]
    fn test_display_is_hex_address() {
        let value = Value::reference("int", Value::Int(1));
        let id = identity_of(&value).unwrap();
        assert!(id.to_string().starts_with("0x"));
        assert_eq!(id.to_string(), identity_of(&value.clone()).unwrap().to_string());
    }

    #[test]
    fn test_wrapper_has_no_identity_of_its_own() {
        let inner = Value::reference("int", Value::Int(1));
        assert_eq!(identity_of(&Value::dynamic(inner)), None);
    }
}
