//! Conversion of plain Rust data into the value model.
//!
//! Conversions build a fresh tree: two equal `Vec`s become two lists with
//! distinct identities. Build [`Value`]s directly and clone them where
//! sharing or cycles should show up in the dump.

use std::collections::{BTreeMap, HashMap};

use crate::value::{Ref, Value};

/// Types that can be described as a [`Value`].
pub trait Dump {
    /// Type name used for containers of this type.
    fn type_name() -> String
    where
        Self: Sized;

    fn to_value(&self) -> Value;
}

macro_rules! impl_dump_scalar {
    ($($ty:ty => $name:literal, $variant:ident($conv:ty)),* $(,)?) => {
        $(
            impl Dump for $ty {
                fn type_name() -> String {
                    $name.to_string()
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $conv)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.to_value()
                }
            }
        )*
    };
}

impl_dump_scalar! {
    i8 => "int8", Int(i64),
    i16 => "int16", Int(i64),
    i32 => "int32", Int(i64),
    i64 => "int64", Int(i64),
    isize => "int", Int(i64),
    u8 => "uint8", Uint(u64),
    u16 => "uint16", Uint(u64),
    u32 => "uint32", Uint(u64),
    u64 => "uint64", Uint(u64),
    usize => "uint", Uint(u64),
    f32 => "float32", F32(f32),
    f64 => "float64", F64(f64),
}

impl Dump for bool {
    fn type_name() -> String {
        "bool".to_string()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl Dump for String {
    fn type_name() -> String {
        "string".to_string()
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl Dump for &str {
    fn type_name() -> String {
        "string".to_string()
    }

    fn to_value(&self) -> Value {
        Value::str(self)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

impl<T: Dump> Dump for Vec<T> {
    fn type_name() -> String {
        format!("[]{}", T::type_name())
    }

    fn to_value(&self) -> Value {
        Value::list(&T::type_name(), self.iter().map(Dump::to_value).collect())
    }
}

impl<T: Dump, const N: usize> Dump for [T; N] {
    fn type_name() -> String {
        format!("[{}]{}", N, T::type_name())
    }

    fn to_value(&self) -> Value {
        Value::array(&T::type_name(), self.iter().map(Dump::to_value).collect())
    }
}

impl<K: Dump, V: Dump> Dump for BTreeMap<K, V> {
    fn type_name() -> String {
        format!("map[{}]{}", K::type_name(), V::type_name())
    }

    fn to_value(&self) -> Value {
        let entries = self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect();
        Value::map(&K::type_name(), &V::type_name(), entries)
    }
}

impl<K: Dump, V: Dump, S> Dump for HashMap<K, V, S> {
    fn type_name() -> String {
        format!("map[{}]{}", K::type_name(), V::type_name())
    }

    fn to_value(&self) -> Value {
        let entries = self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect();
        Value::map(&K::type_name(), &V::type_name(), entries)
    }
}

/// `Option` is a pointer: `None` is nil.
impl<T: Dump> Dump for Option<T> {
    fn type_name() -> String {
        format!("*{}", T::type_name())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => Value::reference(&T::type_name(), inner.to_value()),
            None => Value::Ref(Ref::nil(&T::type_name())),
        }
    }
}

/// A value converted again ends up inside a dynamic wrapper.
impl Dump for Value {
    fn type_name() -> String {
        "interface {}".to_string()
    }

    fn to_value(&self) -> Value {
        Value::dynamic(self.clone())
    }
}
