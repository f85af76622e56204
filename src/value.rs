//! Typed property values and their tag wire layout.
//!
//! The set of kinds is closed and mirrors [`ValueType`]: UTF-8 text, 8-byte
//! little-endian unsigned integers and 8-byte IEEE-754 doubles.

use crate::error::{Error, Result};
use crate::proto::tag::ValueType;

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    String(String),
    Int(u64),
    Double(f64),
}

impl Value {
    /// The wire type code for this value.
    pub fn tag_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Int(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
        }
    }

    /// Encodes the value into its tag byte layout.
    pub fn to_tag_bytes(&self) -> Vec<u8> {
        match self {
            Value::String(s) => s.as_bytes().to_vec(),
            Value::Int(i) => i.to_le_bytes().to_vec(),
            Value::Double(d) => d.to_le_bytes().to_vec(),
        }
    }

    /// Decodes tag bytes of the given type. `key` is only used for error context.
    pub fn from_tag_bytes(key: &str, value_type: ValueType, bytes: &[u8]) -> Result<Self> {
        match value_type {
            ValueType::String => std::str::from_utf8(bytes)
                .map(|s| Value::String(s.to_owned()))
                .map_err(|e| Error::invalid_tag_value(key, e.to_string())),
            ValueType::Int => fixed8(key, bytes).map(|b| Value::Int(u64::from_le_bytes(b))),
            ValueType::Double => fixed8(key, bytes).map(|b| Value::Double(f64::from_le_bytes(b))),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Converts a JSON scalar into a property value.
    ///
    /// Strings, unsigned integers and floats map directly. Booleans, nulls,
    /// arrays, objects and negative integers are rejected with
    /// `Error::UnsupportedPropertyType`; nothing is coerced.
    #[cfg(feature = "serde")]
    pub fn from_json(key: &str, value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;

        let unsupported = |kind| Error::UnsupportedPropertyType {
            key: key.to_owned(),
            kind,
        };
        match value {
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Number(n) => {
                if let Some(i) = n.as_u64() {
                    Ok(Value::Int(i))
                } else if n.is_i64() {
                    Err(unsupported("negative integer"))
                } else {
                    n.as_f64().map(Value::Double).ok_or(unsupported("number"))
                }
            }
            Json::Bool(_) => Err(unsupported("bool")),
            Json::Null => Err(unsupported("null")),
            Json::Array(_) => Err(unsupported("array")),
            Json::Object(_) => Err(unsupported("object")),
        }
    }
}

fn fixed8(key: &str, bytes: &[u8]) -> Result<[u8; 8]> {
    bytes.try_into().map_err(|_| {
        Error::invalid_tag_value(key, format!("expected 8 bytes, got {}", bytes.len()))
    })
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i.into())
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}
