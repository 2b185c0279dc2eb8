/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The value type shared by templates, contexts and expression results.
//!
//! [`Value`] mirrors JSON with two differences: numbers keep an integer/float
//! distinction, and there is a [`Value::Function`] variant holding the array
//! accessors synthesized during context preparation. Objects keep insertion
//! order, which fixes the traversal order of template rendering.

use indexmap::IndexMap;
use serde::ser::{Error as _, Serialize, Serializer};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::rc::Rc;

/// Insertion-ordered object representation.
pub type Map = IndexMap<String, Value>;

/// A JSON-like value with an extra function variant.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// JSON `null`, also used as the "undefined" result of out-of-range access.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    /// Index accessor bound to one array.
    Function(ArrayAccessor),
}

/// Callable giving index access to one array.
///
/// The accessor holds a snapshot of the array it was created from; calling it
/// with an index never fails, it yields [`Value::Null`] for anything that is
/// not a valid position.
#[derive(Clone)]
pub struct ArrayAccessor {
    items: Rc<[Value]>,
}

impl ArrayAccessor {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Element at `index`, or `Null` when out of range or not an index.
    pub fn call(&self, index: &Value) -> Value {
        let position = match index {
            Value::Int(n) => usize::try_from(*n).ok(),
            Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
            Value::String(s) => s.parse::<usize>().ok(),
            _ => None,
        };
        position
            .and_then(|i| self.items.get(i))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl fmt::Debug for ArrayAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayAccessor(len = {})", self.items.len())
    }
}

impl PartialEq for ArrayAccessor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

impl Value {
    /// Check if this value is "truthy" for conditionals and logical operators.
    ///
    /// `null`, `false`, `0`, `NaN` and the empty string are falsy. Everything
    /// else is truthy, including empty arrays and empty objects.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Short kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to plain JSON. Fails if a function appears outside an object.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

/// Stringification used by interpolation and `$switch` label lookup.
///
/// - null: `null`
/// - numbers: integral floats print without a fractional part
/// - strings: verbatim
/// - arrays: elements joined with `,`
/// - objects: compact JSON
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_f64(*x)),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Object(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str("[object]"),
            },
            Value::Function(_) => f.write_str("[function]"),
        }
    }
}

pub(crate) fn format_f64(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        x.to_string()
    }
}

// Accessors are synthesized context metadata, so they are dropped from
// objects. A bare function has no JSON form.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => {
                serializer.serialize_i64(*x as i64)
            }
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(map) => serializer.collect_map(
                map.iter()
                    .filter(|(_, v)| !matches!(v, Value::Function(_))),
            ),
            Value::Function(_) => Err(S::Error::custom(
                "array accessor functions cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
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

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}
