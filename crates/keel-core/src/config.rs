//! Store construction record

use crate::{Value, ValueMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Everything a [`Store`](crate::Store) is built from
///
/// ```rust
/// use keel_core::StoreConfig;
///
/// let config = StoreConfig::new()
///     .with_field("foo", false)
///     .with_field("bar", false)
///     .with_expression("both", "foo is true and bar is true")
///     .with_rule("if foo is true then set bar true");
/// assert_eq!(config.data.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Declared fields and their initial values
    pub data: ValueMap,
    /// Named expressions, compiled in declaration order
    #[serde(default)]
    pub expressions: IndexMap<String, String>,
    /// Rules, run in declaration order on every update
    #[serde(default)]
    pub rules: Vec<String>,
}

impl StoreConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with its initial value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Declare a named expression
    pub fn with_expression(mut self, name: impl Into<String>, sentence: impl Into<String>) -> Self {
        self.expressions.insert(name.into(), sentence.into());
        self
    }

    /// Append a rule
    pub fn with_rule(mut self, sentence: impl Into<String>) -> Self {
        self.rules.push(sentence.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ron() {
        let config: StoreConfig = ron::from_str(
            r#"(
                data: {"foo": false, "page": ()},
                expressions: {"ready": "foo is true"},
                rules: ["if ready then set page home"],
            )"#,
        )
        .unwrap();

        assert_eq!(config.data["foo"], Value::Bool(false));
        assert_eq!(config.data["page"], Value::Null);
        assert_eq!(config.expressions["ready"], "foo is true");
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn test_optional_sections() {
        let config: StoreConfig = ron::from_str(r#"(data: {"foo": 1})"#).unwrap();
        assert!(config.expressions.is_empty());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_builder_keeps_order() {
        let config = StoreConfig::new()
            .with_field("b", 1i64)
            .with_field("a", 2i64)
            .with_rule("inc a")
            .with_rule("inc b");
        assert_eq!(config.data.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(config.rules, vec!["inc a", "inc b"]);
    }
}
