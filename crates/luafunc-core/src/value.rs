//! The host-side dynamic value model.
//!
//! `HostValue` is what callers pass in and what a Lua entry point's result is
//! turned back into. It mirrors a JSON-like type system with a few host
//! distinctions JSON does not make: ordered `List` vs unordered `Set` vs
//! heterogeneous `Tuple`, homogeneous `Map` vs attribute-style `Object`, and an
//! `Unknown` placeholder for values the host has not resolved yet.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};

use crate::error::{LuaFuncError, Result};

/// A dynamically-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    /// Arbitrary-precision decimal.
    Number(Number),
    String(String),
    List(Vec<HostValue>),
    Set(Vec<HostValue>),
    Tuple(Vec<HostValue>),
    Map(BTreeMap<String, HostValue>),
    Object(BTreeMap<String, HostValue>),
    /// A value the host has not resolved yet.
    Unknown,
}

/// The kind of a [`HostValue`], for type introspection and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    Null,
    Bool,
    Number,
    String,
    List,
    Set,
    Tuple,
    Map,
    Object,
    Unknown,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::Null => "null",
            HostKind::Bool => "bool",
            HostKind::Number => "number",
            HostKind::String => "string",
            HostKind::List => "list",
            HostKind::Set => "set",
            HostKind::Tuple => "tuple",
            HostKind::Map => "map",
            HostKind::Object => "object",
            HostKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HostValue {
    pub fn kind(&self) -> HostKind {
        match self {
            HostValue::Null => HostKind::Null,
            HostValue::Bool(_) => HostKind::Bool,
            HostValue::Number(_) => HostKind::Number,
            HostValue::String(_) => HostKind::String,
            HostValue::List(_) => HostKind::List,
            HostValue::Set(_) => HostKind::Set,
            HostValue::Tuple(_) => HostKind::Tuple,
            HostValue::Map(_) => HostKind::Map,
            HostValue::Object(_) => HostKind::Object,
            HostValue::Unknown => HostKind::Unknown,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// True if this value or anything nested inside it is `Unknown`.
    pub fn contains_unknown(&self) -> bool {
        match self {
            HostValue::Unknown => true,
            HostValue::List(items) | HostValue::Set(items) | HostValue::Tuple(items) => {
                items.iter().any(HostValue::contains_unknown)
            }
            HostValue::Map(entries) | HostValue::Object(entries) => {
                entries.values().any(HostValue::contains_unknown)
            }
            _ => false,
        }
    }

    /// Build a number from a float. Returns `None` for NaN and infinities.
    ///
    /// Integral floats that fit in an `i64` are stored as integers, so `7.0`
    /// and `7` are the same host number.
    pub fn from_f64(f: f64) -> Option<HostValue> {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return Some(HostValue::from(f as i64));
        }
        Number::from_f64(f).map(HostValue::Number)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Build an `Object` from key/value pairs.
    pub fn object<K, I>(entries: I) -> HostValue
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, HostValue)>,
    {
        HostValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for HostValue {
                fn from(n: $t) -> Self {
                    HostValue::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        HostValue::List(items)
    }
}

impl From<Value> for HostValue {
    /// JSON arrays become `List`, JSON objects become `Object`.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => HostValue::Number(n),
            Value::String(s) => HostValue::String(s),
            Value::Array(items) => HostValue::List(items.into_iter().map(HostValue::from).collect()),
            Value::Object(map) => HostValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, HostValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<&HostValue> for Value {
    type Error = LuaFuncError;

    /// List-likes become arrays and map-likes become objects. `Unknown` has no
    /// JSON form.
    fn try_from(value: &HostValue) -> Result<Self> {
        Ok(match value {
            HostValue::Null => Value::Null,
            HostValue::Bool(b) => Value::Bool(*b),
            HostValue::Number(n) => Value::Number(n.clone()),
            HostValue::String(s) => Value::String(s.clone()),
            HostValue::List(items) | HostValue::Set(items) | HostValue::Tuple(items) => {
                Value::Array(items.iter().map(Value::try_from).collect::<Result<_>>()?)
            }
            HostValue::Map(entries) | HostValue::Object(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), Value::try_from(v)?);
                }
                Value::Object(map)
            }
            HostValue::Unknown => return Err(LuaFuncError::UnsupportedType(HostKind::Unknown)),
        })
    }
}

impl TryFrom<HostValue> for Value {
    type Error = LuaFuncError;

    fn try_from(value: HostValue) -> Result<Self> {
        Value::try_from(&value)
    }
}
