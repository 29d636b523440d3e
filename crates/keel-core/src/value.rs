//! Dynamic value types held by state fields

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A field value
///
/// Serialized untagged, so configs and exported history read as plain
/// literals: `true`, `3`, `"login"`, `()` / `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value / null
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    String(String),
}

/// A map of field names to values
///
/// Uses IndexMap to preserve declaration order
pub type ValueMap = IndexMap<String, Value>;

impl Value {
    /// Coerce a literal word from a sentence into a value
    ///
    /// `true`/`false` become booleans, all-digit words integers, `null` the
    /// null value; anything else stays a string.
    pub fn from_literal(word: &str) -> Self {
        match word {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            w if !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()) => w
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::String(w.to_string())),
            w => Value::String(w.to_string()),
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric reading used by `greater than` / `less than`
    ///
    /// Null reads as 0 and booleans as 0/1. Strings only count when they
    /// hold an integer.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Null => Some(0),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
        }
    }

    /// The value `inc` writes back for this value
    pub fn incremented(&self) -> Value {
        match self {
            Value::String(s) => Value::String(format!("{}1", s)),
            other => Value::Int(other.as_number().unwrap_or(0).saturating_add(1)),
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
        }
    }

    /// Check if this value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
