//! Data handed to listeners

use crate::{Value, ValueMap};

/// What a listener receives when its trigger fires
///
/// Listeners get a shared reference, so the payload cannot be written to;
/// state changes go through [`Store::update`](crate::Store::update) or
/// [`Store::set`](crate::Store::set).
///
/// ```rust,compile_fail
/// use keel_core::{Payload, Value};
///
/// fn listener(payload: &Payload) {
///     *payload = Payload::Value(Value::Bool(false));
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The single requested prop
    Value(Value),
    /// Several requested props, or every field when none were requested
    Fields(ValueMap),
}

impl Payload {
    /// The value of a single-prop payload
    pub fn value(&self) -> Option<&Value> {
        match self {
            Payload::Value(v) => Some(v),
            Payload::Fields(_) => None,
        }
    }

    /// Look up a field of a multi-field payload
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Payload::Value(_) => None,
            Payload::Fields(fields) => fields.get(name),
        }
    }

    /// The fields of a multi-field payload
    pub fn fields(&self) -> Option<&ValueMap> {
        match self {
            Payload::Value(_) => None,
            Payload::Fields(fields) => Some(fields),
        }
    }
}
