//! Cycle-safe, deterministic debug dumps of value graphs.
//!
//! `graphdump` prints an in-memory value graph as readable, Go-literal-like
//! text. Values reachable through more than one reference are printed in full
//! once and referred to by a short label (`p0`, `p1`, ...) everywhere else, so
//! cyclic graphs terminate and shared structure stays visible.
//!
//! ## Overview
//!
//! A dump runs in two passes over all arguments of one call:
//!
//! 1. [`scan`] finds every identity reachable through two or more references.
//! 2. The renderer prints the arguments, handing out labels in the order the
//!    reused identities are met.
//!
//! ```
//! use graphdump::{Options, Value};
//!
//! let shared = Value::reference("int", Value::Int(1));
//! let list = Value::list("*int", vec![shared.clone(), shared]);
//!
//! assert_eq!(
//!     Options::default().sdump(&[list]),
//!     "[]*int{\n  &1, // p0\n  p0,\n}",
//! );
//! ```
//!
//! ## Modules
//!
//! - [`value`] - The value model and the [`Dumper`] hook
//! - [`convert`] - The [`Dump`] trait for plain Rust data
//! - [`identity`] - Identity tokens of reference-bearing values
//! - [`scan`] - Reachability pre-pass
//! - [`labels`] - Label registry
//! - [`options`] - [`Options`], the process-wide default and TOML loading
//! - [`render`] - The renderer
//! - [`error`] - Error types

pub mod convert;
pub mod error;
pub mod identity;
pub mod labels;
pub mod options;
pub mod render;
pub mod scan;
mod type_name;
pub mod value;

pub use convert::Dump;
pub use error::{DumpError, DumpResult};
pub use identity::{identity_of, Identity};
pub use labels::{Label, LabelRegistry};
pub use options::{config, set_config, update_config, DumpFunc, FieldFilter, Options, OptionsFile};
pub use render::render;
pub use scan::{scan, ReusedSet};
pub use value::{Array, Chan, Custom, Dumper, Field, Func, List, Map, Opaque, Record, Ref, Value};

use std::io;

/// Render `values` to stdout with the process-wide default options,
/// followed by a newline.
pub fn dump(values: &[Value]) {
    config().dump(values)
}

/// Render `values` to a string with the process-wide default options.
pub fn sdump(values: &[Value]) -> String {
    config().sdump(values)
}

/// Render `values` into `w` with the process-wide default options.
pub fn fdump(w: &mut dyn io::Write, values: &[Value]) -> DumpResult<()> {
    config().fdump(w, values)
}
