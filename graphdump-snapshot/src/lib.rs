//! Snapshot test macros for graphdump output.
//!
//! The macros render values with [`graphdump::Options::sdump`] and hand the
//! text to [`insta`], so value graphs can be reviewed and updated with
//! `cargo insta` like any other snapshot.

pub use graphdump;
pub use insta;

/// Assert that the dump of a set of values matches a snapshot.
///
/// Values are passed in brackets and rendered together as the arguments of
/// one call, so sharing between them shows up as labels.
///
/// # Forms
///
/// - `assert_dump_snapshot!("name", [values...])`: named snapshot, default options
/// - `assert_dump_snapshot!("name", options, [values...])`: named snapshot
/// - `assert_dump_snapshot!([values...], @"...")`: inline snapshot, default options
/// - `assert_dump_snapshot!(options, [values...], @"...")`: inline snapshot
///
/// The default options are `Options::default()`, never the process-wide
/// default, so snapshots do not depend on shared state.
///
/// # Example
///
/// ```ignore
/// use graphdump::{Field, Ref, Value};
/// use graphdump_snapshot::assert_dump_snapshot;
///
/// #[test]
/// fn test_linked_list() {
///     let head = Ref::new("Node", Value::nil());
///     head.set(Value::record("Node", vec![Field::public("Next", Value::Ref(head.clone()))]));
///
///     assert_dump_snapshot!("linked_list", [Value::Ref(head)]);
/// }
/// ```
#[macro_export]
macro_rules! assert_dump_snapshot {
    ([$($value:expr),+ $(,)?], @$snapshot:literal) => {{
        let text = $crate::graphdump::Options::default().sdump(&[$($value),+]);
        $crate::insta::assert_snapshot!(text, @$snapshot);
    }};

    ($name:literal, [$($value:expr),+ $(,)?]) => {{
        let text = $crate::graphdump::Options::default().sdump(&[$($value),+]);
        $crate::insta::assert_snapshot!($name, text);
    }};

    ($name:literal, $options:expr, [$($value:expr),+ $(,)?]) => {{
        let options: $crate::graphdump::Options = $options;
        let text = options.sdump(&[$($value),+]);
        $crate::insta::assert_snapshot!($name, text);
    }};

    ($options:expr, [$($value:expr),+ $(,)?], @$snapshot:literal) => {{
        let options: $crate::graphdump::Options = $options;
        let text = options.sdump(&[$($value),+]);
        $crate::insta::assert_snapshot!(text, @$snapshot);
    }};
}
