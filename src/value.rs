//! The value model dumps are rendered from.
//!
//! A [`Value`] is a closed set of categories: scalars, sequences, mappings,
//! records, references, dynamically-typed wrappers, functions, channel-like
//! handles and values that format themselves. Reference semantics are carried
//! by `Rc`: cloning a [`List`], [`Map`], [`Ref`] or [`Custom`] shares the
//! backing storage, so the clone has the same identity as the original.
//!
//! # Example
//!
//! ```
//! use graphdump::{Field, Ref, Value};
//!
//! // A record that points to itself.
//! let node = Ref::new("Circular", Value::nil());
//! node.set(Value::record("Circular", vec![
//!     Field::public("Self", Value::Ref(node.clone())),
//! ]));
//!
//! assert_eq!(
//!     graphdump::sdump(&[Value::Ref(node)]),
//!     "&Circular{ // p0\n  Self: p0,\n}",
//! );
//! ```

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Implemented by types that print themselves.
///
/// The hook output is captured, prefixed with the value's type name and
/// re-indented to the depth at which the value appears.
pub trait Dumper {
    fn dump(&self, w: &mut dyn io::Write) -> io::Result<()>;
}

/// A node of the value graph.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    /// Signed integer of any width.
    Int(i64),
    /// Unsigned integer of any width.
    Uint(u64),
    F32(f32),
    F64(f64),
    /// Complex number with `f32` parts, `(re, im)`.
    Complex64(f32, f32),
    /// Complex number with `f64` parts, `(re, im)`.
    Complex128(f64, f64),
    Str(String),
    /// Sequence with reference semantics.
    List(List),
    /// Sequence held by value.
    Array(Array),
    Map(Map),
    Record(Record),
    /// Pointer to a mutable cell, the building block for cycles.
    Ref(Ref),
    /// Dynamically-typed wrapper; `None` is the nil wrapper.
    Dyn(Option<Box<Value>>),
    Func(Func),
    Chan(Chan),
    Custom(Custom),
    Time(DateTime<FixedOffset>),
    /// Anything the model has no category for, kept as preformatted text.
    Opaque(Opaque),
}

/// Sequence whose backing storage may be shared.
#[derive(Clone)]
pub struct List {
    /// Full type name, e.g. `[]int`.
    pub type_name: String,
    /// `None` is the nil sequence.
    pub items: Option<Rc<Vec<Value>>>,
}

impl List {
    /// A sequence of `elem_type` elements.
    pub fn new(elem_type: &str, items: Vec<Value>) -> Self {
        Self {
            type_name: format!("[]{}", elem_type),
            items: Some(Rc::new(items)),
        }
    }

    /// The nil sequence of `elem_type` elements.
    pub fn nil(elem_type: &str) -> Self {
        Self {
            type_name: format!("[]{}", elem_type),
            items: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, |items| items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().flat_map(|items| items.iter())
    }
}

/// Fixed-size sequence copied by value; it has no identity of its own.
#[derive(Clone)]
pub struct Array {
    /// Full type name, e.g. `[3]int`.
    pub type_name: String,
    pub items: Vec<Value>,
}

impl Array {
    pub fn new(elem_type: &str, items: Vec<Value>) -> Self {
        Self {
            type_name: format!("[{}]{}", items.len(), elem_type),
            items,
        }
    }
}

/// Mapping whose entries may be shared.
///
/// Keys are arbitrary values, so entries are kept as pairs. Rendering orders
/// them by the text of the rendered keys, never by insertion order.
#[derive(Clone)]
pub struct Map {
    /// Full type name, e.g. `map[string]int`.
    pub type_name: String,
    /// `None` is the nil map, which renders differently from an empty one.
    pub entries: Option<Rc<Vec<(Value, Value)>>>,
}

impl Map {
    pub fn new(key_type: &str, value_type: &str, entries: Vec<(Value, Value)>) -> Self {
        Self {
            type_name: format!("map[{}]{}", key_type, value_type),
            entries: Some(Rc::new(entries)),
        }
    }

    pub fn nil(key_type: &str, value_type: &str) -> Self {
        Self {
            type_name: format!("map[{}]{}", key_type, value_type),
            entries: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter().flat_map(|entries| entries.iter())
    }
}

/// Struct-like value with named fields in declaration order.
#[derive(Clone)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<Field>,
}

/// A named record field.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    /// Non-exported fields are hidden when `hide_private_fields` is set.
    pub exported: bool,
    pub value: Value,
}

impl Field {
    pub fn public(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            exported: true,
            value,
        }
    }

    pub fn private(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            exported: false,
            value,
        }
    }
}

/// Pointer to a shared, mutable cell.
#[derive(Clone)]
pub struct Ref {
    /// Type name of the pointee; the pointer type is `*` followed by it.
    pub elem_type: String,
    /// `None` is the nil pointer.
    pub target: Option<Rc<RefCell<Value>>>,
}

impl Ref {
    pub fn new(elem_type: &str, value: Value) -> Self {
        Self {
            elem_type: elem_type.to_string(),
            target: Some(Rc::new(RefCell::new(value))),
        }
    }

    pub fn nil(elem_type: &str) -> Self {
        Self {
            elem_type: elem_type.to_string(),
            target: None,
        }
    }

    /// Replace the pointee. Returns `false` for a nil pointer.
    ///
    /// Allocate with a placeholder, then `set` the real value once it holds
    /// clones of this pointer to build a cycle.
    pub fn set(&self, value: Value) -> bool {
        match &self.target {
            Some(cell) => {
                *cell.borrow_mut() = value;
                true
            }
            None => false,
        }
    }
}

/// A function value.
#[derive(Clone, Debug)]
pub struct Func {
    /// Qualified path of the defining location, e.g. `my_crate::parse`.
    pub path: String,
    /// Rendered instead of the path for closures.
    pub signature: String,
}

impl Func {
    pub fn new(path: &str, signature: &str) -> Self {
        Self {
            path: path.to_string(),
            signature: signature.to_string(),
        }
    }

    /// Describe `f`, taking its path from the compiler's type name.
    pub fn of<F>(_f: &F, signature: &str) -> Self {
        Self::new(std::any::type_name::<F>(), signature)
    }

    /// Closures have no usable name, only a signature.
    pub fn is_closure(&self) -> bool {
        self.path.contains("{{closure}}")
    }
}

/// Channel-like handle; it carries nothing but its type.
#[derive(Clone, Debug)]
pub struct Chan {
    pub type_name: String,
}

/// A value that formats itself through a [`Dumper`].
#[derive(Clone)]
pub struct Custom {
    pub type_name: String,
    pub dumper: Rc<dyn Dumper>,
}

/// Fallback for values outside the model.
#[derive(Clone, Debug)]
pub struct Opaque {
    pub type_name: String,
    pub text: String,
}

impl Opaque {
    /// Capture `value` through its `Debug` output.
    pub fn of<T: fmt::Debug>(value: &T) -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            text: format!("{:?}", value),
        }
    }
}

impl Value {
    /// The nil dynamically-typed wrapper.
    pub fn nil() -> Self {
        Value::Dyn(None)
    }

    pub fn str(text: &str) -> Self {
        Value::Str(text.to_string())
    }

    pub fn list(elem_type: &str, items: Vec<Value>) -> Self {
        Value::List(List::new(elem_type, items))
    }

    pub fn array(elem_type: &str, items: Vec<Value>) -> Self {
        Value::Array(Array::new(elem_type, items))
    }

    pub fn map(key_type: &str, value_type: &str, entries: Vec<(Value, Value)>) -> Self {
        Value::Map(Map::new(key_type, value_type, entries))
    }

    pub fn record(type_name: &str, fields: Vec<Field>) -> Self {
        Value::Record(Record {
            type_name: type_name.to_string(),
            fields,
        })
    }

    /// A fresh pointer to `value`.
    pub fn reference(elem_type: &str, value: Value) -> Self {
        Value::Ref(Ref::new(elem_type, value))
    }

    /// Wrap `value` in a dynamically-typed wrapper.
    pub fn dynamic(value: Value) -> Self {
        Value::Dyn(Some(Box::new(value)))
    }

    pub fn custom<D: Dumper + 'static>(type_name: &str, dumper: D) -> Self {
        Value::Custom(Custom {
            type_name: type_name.to_string(),
            dumper: Rc::new(dumper),
        })
    }

    pub fn chan(type_name: &str) -> Self {
        Value::Chan(Chan {
            type_name: type_name.to_string(),
        })
    }

    /// Runtime type name, as printed in front of composite values.
    pub fn type_name(&self) -> Cow<'_, str> {
        match self {
            Value::Bool(_) => Cow::Borrowed("bool"),
            Value::Int(_) => Cow::Borrowed("int"),
            Value::Uint(_) => Cow::Borrowed("uint"),
            Value::F32(_) => Cow::Borrowed("float32"),
            Value::F64(_) => Cow::Borrowed("float64"),
            Value::Complex64(..) => Cow::Borrowed("complex64"),
            Value::Complex128(..) => Cow::Borrowed("complex128"),
            Value::Str(_) => Cow::Borrowed("string"),
            Value::List(list) => Cow::Borrowed(&list.type_name),
            Value::Array(array) => Cow::Borrowed(&array.type_name),
            Value::Map(map) => Cow::Borrowed(&map.type_name),
            Value::Record(record) => Cow::Borrowed(&record.type_name),
            Value::Ref(r) => Cow::Owned(format!("*{}", r.elem_type)),
            Value::Dyn(_) => Cow::Borrowed("interface {}"),
            Value::Func(func) => Cow::Borrowed(&func.signature),
            Value::Chan(chan) => Cow::Borrowed(&chan.type_name),
            Value::Custom(custom) => Cow::Borrowed(&custom.type_name),
            Value::Time(_) => Cow::Borrowed("time.Time"),
            Value::Opaque(opaque) => Cow::Borrowed(&opaque.type_name),
        }
    }

    /// Whether this is the zero value of its type.
    ///
    /// Empty but allocated sequences and maps are not zero; nil ones are.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::Int(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::F32(x) => *x == 0.0,
            Value::F64(x) => *x == 0.0,
            Value::Complex64(re, im) => *re == 0.0 && *im == 0.0,
            Value::Complex128(re, im) => *re == 0.0 && *im == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::List(list) => list.items.is_none(),
            Value::Array(array) => array.items.iter().all(Value::is_zero),
            Value::Map(map) => map.entries.is_none(),
            Value::Record(record) => record.fields.iter().all(|f| f.value.is_zero()),
            Value::Ref(r) => r.target.is_none(),
            Value::Dyn(inner) => inner.is_none(),
            Value::Time(t) => is_zero_time(t),
            Value::Func(_) | Value::Chan(_) | Value::Custom(_) | Value::Opaque(_) => false,
        }
    }
}

/// The zero instant is midnight UTC on January 1st of year 1.
fn is_zero_time(t: &DateTime<FixedOffset>) -> bool {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(false, |zero| t.naive_utc() == zero)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        crate::Options::default()
            .with_compact(true)
            .fdump(&mut buf, std::slice::from_ref(self))
            .map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}
