//! Export store history to various formats

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use keel_core::{Snapshot, Value};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Export format version
const EXPORT_VERSION: u32 = 1;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
    /// CSV format, one row per snapshot
    Csv,
    /// Human-readable text format
    Text,
}

/// Exporter for store history
pub struct Exporter<'a> {
    history: &'a [Snapshot],
}

impl<'a> Exporter<'a> {
    /// Create a new exporter over a history, oldest snapshot first
    pub fn new(history: &'a [Snapshot]) -> Self {
        Self { history }
    }

    /// Export to a string in the specified format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Ron => self.to_ron(),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => Ok(self.to_csv()),
            ExportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let content = self.export(format)?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(e.to_string()))?;
        Ok(())
    }

    /// Export to RON format
    pub fn to_ron(&self) -> Result<String> {
        let export = ExportData::new(self.history, 0);
        ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Export to JSON format
    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String> {
        let export = ExportData::new(self.history, 0);
        serde_json::to_string_pretty(&export).map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(not(feature = "serde_json"))]
    pub fn to_json(&self) -> Result<String> {
        Err(Error::ExportError(
            "JSON export requires the 'serde_json' feature".to_string(),
        ))
    }

    /// Export to CSV format
    ///
    /// Columns follow the field order of the first snapshot; null values are
    /// left empty.
    pub fn to_csv(&self) -> String {
        let fields: Vec<&str> = self
            .history
            .first()
            .map(|s| s.iter().map(|(name, _)| name).collect())
            .unwrap_or_default();

        let mut output = String::from("version");
        for field in &fields {
            output.push(',');
            output.push_str(&csv_cell(field));
        }
        output.push('\n');

        for (version, snapshot) in self.history.iter().enumerate() {
            output.push_str(&version.to_string());
            for field in &fields {
                output.push(',');
                output.push_str(&snapshot.get(field).map(csv_value).unwrap_or_default());
            }
            output.push('\n');
        }

        output
    }

    /// Export to human-readable text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("=== History Export ===\n\n");
        output.push_str(&format!("Snapshots: {}\n", self.history.len()));
        if let Some(first) = self.history.first() {
            let names: Vec<&str> = first.iter().map(|(name, _)| name).collect();
            output.push_str(&format!("Fields: {}\n", names.join(", ")));
        }

        output.push_str("\n=== Snapshots ===\n");

        let mut previous: Option<&Snapshot> = None;
        for (version, snapshot) in self.history.iter().enumerate() {
            output.push_str(&format!("\n--- Version {} ---\n", version));
            for (name, value) in snapshot.iter() {
                let changed = previous.is_some_and(|p| p.get(name) != Some(value));
                let marker = if changed { "*" } else { " " };
                output.push_str(&format!(" {} {}: {}\n", marker, name, value));
            }
            previous = Some(snapshot);
        }

        output
    }

    /// Export only the snapshots in an inclusive version range
    pub fn export_range(&self, start: usize, end: usize, format: ExportFormat) -> Result<String> {
        if end >= self.history.len() {
            return Err(Error::InvalidIndex {
                index: end,
                len: self.history.len(),
            });
        }
        if start > end {
            return Err(Error::InvalidIndex {
                index: start,
                len: end + 1,
            });
        }
        let export = ExportData::new(&self.history[start..=end], start);

        match format {
            ExportFormat::Ron => {
                ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
                    .map_err(|e| Error::Serialization(e.to_string()))
            }
            #[cfg(feature = "serde_json")]
            ExportFormat::Json => serde_json::to_string_pretty(&export)
                .map_err(|e| Error::Serialization(e.to_string())),
            #[cfg(not(feature = "serde_json"))]
            ExportFormat::Json => Err(Error::ExportError(
                "JSON export requires the 'serde_json' feature".to_string(),
            )),
            _ => Err(Error::ExportError(
                "Range export only supports RON and JSON".to_string(),
            )),
        }
    }
}

/// Read back the snapshots of a RON export
pub fn import_ron(content: &str) -> Result<Vec<Snapshot>> {
    let export: ExportData = ron::from_str(content).map_err(|e| Error::Serialization(e.to_string()))?;
    export.into_snapshots()
}

/// Read back the snapshots of a JSON export
#[cfg(feature = "serde_json")]
pub fn import_json(content: &str) -> Result<Vec<Snapshot>> {
    let export: ExportData =
        serde_json::from_str(content).map_err(|e| Error::Serialization(e.to_string()))?;
    export.into_snapshots()
}

/// Data structure for history export
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExportData {
    version: u32,
    exported_at: DateTime<Utc>,
    /// Version number of the first exported snapshot
    first_version: usize,
    snapshots: Vec<Snapshot>,
}

impl ExportData {
    fn new(snapshots: &[Snapshot], first_version: usize) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            first_version,
            snapshots: snapshots.to_vec(),
        }
    }

    fn into_snapshots(self) -> Result<Vec<Snapshot>> {
        if self.version != EXPORT_VERSION {
            return Err(Error::ExportError(format!(
                "unsupported export version {}",
                self.version
            )));
        }
        Ok(self.snapshots)
    }
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::String(s) => csv_cell(s),
    }
}

fn csv_cell(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::{Store, StoreConfig};

    fn create_test_store() -> Store {
        let mut store = Store::new(
            StoreConfig::new()
                .with_field("page", "loading")
                .with_field("attempts", 0i64)
                .with_field("alert", Value::Null)
                .with_rule("if page is now login then inc attempts"),
        )
        .unwrap();
        store.update([("page", "login")]).unwrap();
        store.update([("alert", "bad, \"worse\"")]).unwrap();
        store
    }

    #[test]
    fn test_export_ron() {
        let store = create_test_store();
        let exporter = Exporter::new(store.history());
        let ron = exporter.to_ron().unwrap();

        assert!(ron.contains("version"));
        assert!(ron.contains("exported_at"));
        assert!(ron.contains("snapshots"));
    }

    #[test]
    fn test_ron_restores_into_a_store() {
        let store = create_test_store();
        let ron = Exporter::new(store.history()).to_ron().unwrap();
        let snapshots = import_ron(&ron).unwrap();
        assert_eq!(snapshots.as_slice(), store.history());

        let mut fresh = Store::new(
            StoreConfig::new()
                .with_field("page", "loading")
                .with_field("attempts", 0i64)
                .with_field("alert", Value::Null),
        )
        .unwrap();
        fresh.set_history(snapshots).unwrap();
        assert_eq!(fresh.get("attempts"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_export_csv() {
        let store = create_test_store();
        let csv = Exporter::new(store.history()).to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "version,page,attempts,alert");
        assert_eq!(lines[1], "0,loading,0,");
        assert_eq!(lines[2], "1,login,1,");
        assert_eq!(lines[3], "2,login,1,\"bad, \"\"worse\"\"\"");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_export_text() {
        let store = create_test_store();
        let text = Exporter::new(store.history()).to_text();

        assert!(text.contains("History Export"));
        assert!(text.contains("Snapshots: 3"));
        assert!(text.contains("--- Version 2 ---"));
        assert!(text.contains("* attempts: 1"));
    }

    #[test]
    fn test_export_range() {
        let store = create_test_store();
        let exporter = Exporter::new(store.history());

        let ron = exporter.export_range(1, 2, ExportFormat::Ron).unwrap();
        assert_eq!(import_ron(&ron).unwrap().len(), 2);

        assert!(matches!(
            exporter.export_range(0, 3, ExportFormat::Ron),
            Err(Error::InvalidIndex { index: 3, len: 3 })
        ));
        assert!(matches!(
            exporter.export_range(0, 1, ExportFormat::Csv),
            Err(Error::ExportError(_))
        ));
    }

    #[test]
    fn test_export_to_writer() {
        let store = create_test_store();
        let mut buffer = Vec::new();
        Exporter::new(store.history())
            .export_to(&mut buffer, ExportFormat::Csv)
            .unwrap();
        assert!(String::from_utf8(buffer).unwrap().starts_with("version,"));
    }

    #[cfg(not(feature = "serde_json"))]
    #[test]
    fn test_json_requires_feature() {
        let store = create_test_store();
        assert!(matches!(
            Exporter::new(store.history()).to_json(),
            Err(Error::ExportError(_))
        ));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_json_round_trip() {
        let store = create_test_store();
        let json = Exporter::new(store.history()).to_json().unwrap();
        assert_eq!(import_json(&json).unwrap().as_slice(), store.history());
    }
}
