//! Immutable copies of the field mapping

use crate::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// All fields at one point in history
///
/// Serializes as a plain field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: ValueMap,
}

impl Snapshot {
    /// Capture a copy of the given fields
    pub fn new(fields: ValueMap) -> Self {
        Self { fields }
    }

    /// Read one field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All fields, in declaration order
    pub fn fields(&self) -> &ValueMap {
        &self.fields
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the snapshot holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether this snapshot holds exactly the given field names
    pub fn has_fields<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        let mut count = 0;
        for name in names {
            if !self.fields.contains_key(name) {
                return false;
            }
            count += 1;
        }
        count == self.fields.len()
    }

    /// Give up the snapshot and take its fields
    pub fn into_fields(self) -> ValueMap {
        self.fields
    }
}

impl From<ValueMap> for Snapshot {
    fn from(fields: ValueMap) -> Self {
        Self::new(fields)
    }
}

impl FromIterator<(String, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
