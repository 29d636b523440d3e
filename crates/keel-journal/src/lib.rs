//! Keel Journal - History export, auditing, and rewind
//!
//! This crate works on the snapshot history a `keel_core::Store` keeps:
//!
//! - **Auditor**: Per-update field changes and change counts per field
//! - **Replayer**: Rewind a store, or step it through a recorded history
//! - **Exporter**: Export history to RON, JSON, CSV or text
//!
//! # Example
//!
//! ```rust
//! use keel_core::{Store, StoreConfig, Value};
//! use keel_journal::{Auditor, ExportFormat, Exporter, Replayer};
//!
//! let mut store = Store::new(
//!     StoreConfig::new()
//!         .with_field("count", 0i64)
//!         .with_rule("inc count"),
//! )
//! .unwrap();
//! store.update([("count", 10i64)]).unwrap();
//! store.update([("count", 20i64)]).unwrap();
//!
//! // Audit the session
//! let report = Auditor::new(store.history()).generate_report();
//! assert_eq!(report.update_count, 2);
//!
//! // Export for external analysis
//! let csv = Exporter::new(store.history()).export(ExportFormat::Csv).unwrap();
//! assert!(csv.starts_with("version,count"));
//!
//! // Rewind to the first update
//! Replayer::rewind(&mut store, 1).unwrap();
//! assert_eq!(store.get("count"), Some(&Value::Int(11)));
//! ```

mod auditor;
mod error;
mod exporter;
mod replayer;

pub use auditor::{AuditQuery, AuditReport, Auditor, FieldChange};
pub use error::{Error, Result};
pub use exporter::{import_ron, ExportFormat, Exporter};
pub use replayer::{ReplayState, Replayer};

#[cfg(feature = "serde_json")]
pub use exporter::import_json;

// Re-export core history types for convenience
pub use keel_core::{Snapshot, Store};
