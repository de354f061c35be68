//! Dynamic values carried through pipelines.
//!
//! Stages are opaque unary functions, so every value flowing between them
//! shares one type: [`Value`]. The important classification lives here:
//! text and binary values are iterable but *atomic*, meaning no pipeline ever
//! expands them into their characters or bytes. Lists and maps are the only
//! values that fan out.

use crate::errors::ValueError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically typed pipeline value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Text scalar. Atomic.
    Text(String),
    /// Ordered container. Fans out into its elements.
    List(Vec<Value>),
    /// Keyed container. Fans out into its keys, in key order.
    Map(BTreeMap<String, Value>),
    /// Binary blob. Atomic.
    Bytes(Vec<u8>),
}

impl Value {
    /// Build a binary value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Build a list value from anything convertible into values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, used in diagnostics and [`ValueError`].
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Whether this is `Null`, the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text and binary values are atomic: iterable, yet never expanded.
    pub fn is_atomic(&self) -> bool {
        matches!(self, Value::Text(_) | Value::Bytes(_))
    }

    /// Whether the value can be iterated at all, atomic values included.
    pub fn is_iterable(&self) -> bool {
        matches!(
            self,
            Value::Text(_) | Value::Bytes(_) | Value::List(_) | Value::Map(_)
        )
    }

    /// Whether a pipeline may expand this value into several items.
    pub fn fans_out(&self) -> bool {
        self.is_iterable() && !self.is_atomic()
    }

    /// Split a fan-out value into its ordered items.
    ///
    /// Returns the value unchanged in `Err` when it does not fan out.
    pub fn into_items(self) -> Result<Vec<Value>, Value> {
        match self {
            Value::List(items) => Ok(items),
            Value::Map(map) => Ok(map.into_keys().map(Value::Text).collect()),
            other => Err(other),
        }
    }

    /// Boolean payload, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float view of the value; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Text payload, if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Binary payload, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// List items, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Entries, if this is a `Map`.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Like [`as_bool`](Self::as_bool), failing with [`ValueError::TypeMismatch`].
    pub fn try_bool(&self) -> Result<bool, ValueError> {
        self.as_bool()
            .ok_or_else(|| ValueError::mismatch("bool", self.kind()))
    }

    /// Like [`as_int`](Self::as_int), failing with [`ValueError::TypeMismatch`].
    pub fn try_int(&self) -> Result<i64, ValueError> {
        self.as_int()
            .ok_or_else(|| ValueError::mismatch("int", self.kind()))
    }

    /// Like [`as_float`](Self::as_float), failing with [`ValueError::TypeMismatch`].
    pub fn try_float(&self) -> Result<f64, ValueError> {
        self.as_float()
            .ok_or_else(|| ValueError::mismatch("float", self.kind()))
    }

    /// Like [`as_str`](Self::as_str), failing with [`ValueError::TypeMismatch`].
    pub fn try_str(&self) -> Result<&str, ValueError> {
        self.as_str()
            .ok_or_else(|| ValueError::mismatch("text", self.kind()))
    }

    /// Like [`as_list`](Self::as_list), failing with [`ValueError::TypeMismatch`].
    pub fn try_list(&self) -> Result<&[Value], ValueError> {
        self.as_list()
            .ok_or_else(|| ValueError::mismatch("list", self.kind()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "'{}'", s.escape_default()),
            Value::Bytes(b) => write!(f, "b'{}'", b.escape_ascii()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}': {}", key.escape_default(), value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}
