//! Auditing and analytics for store history

use indexmap::IndexMap;
use keel_core::{Snapshot, Value};

/// One field changing between two consecutive snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// History index of the snapshot the change landed in
    pub version: usize,
    /// Field name
    pub field: String,
    /// Value in the preceding snapshot
    pub from: Value,
    /// Value in this snapshot
    pub to: Value,
}

/// Auditor for querying and analyzing store history
pub struct Auditor<'a> {
    history: &'a [Snapshot],
}

impl<'a> Auditor<'a> {
    /// Create a new auditor for a history, oldest snapshot first
    pub fn new(history: &'a [Snapshot]) -> Self {
        Self { history }
    }

    /// Field changes that landed in one snapshot
    ///
    /// The first snapshot has nothing to compare against, so it reports no
    /// changes.
    pub fn changes_at(&self, version: usize) -> Vec<FieldChange> {
        let (Some(before), Some(after)) = (
            version.checked_sub(1).and_then(|v| self.history.get(v)),
            self.history.get(version),
        ) else {
            return Vec::new();
        };

        after
            .iter()
            .filter_map(|(field, to)| {
                let from = before.get(field).cloned().unwrap_or_default();
                (from != *to).then(|| FieldChange {
                    version,
                    field: field.to_string(),
                    from,
                    to: to.clone(),
                })
            })
            .collect()
    }

    /// Every field change, oldest first
    pub fn changes(&self) -> Vec<FieldChange> {
        (1..self.history.len())
            .flat_map(|version| self.changes_at(version))
            .collect()
    }

    /// Query changes matching specific criteria
    pub fn query(&self, query: &AuditQuery) -> Vec<FieldChange> {
        self.changes()
            .into_iter()
            .filter(|change| query.matches(change))
            .collect()
    }

    /// Number of updates that changed each field, in field order
    pub fn change_counts(&self) -> IndexMap<String, u64> {
        let mut counts: IndexMap<String, u64> = self
            .history
            .first()
            .map(|s| s.iter().map(|(name, _)| (name.to_string(), 0)).collect())
            .unwrap_or_default();

        for change in self.changes() {
            *counts.entry(change.field).or_insert(0) += 1;
        }
        counts
    }

    /// Values a field took over the history, one per snapshot
    pub fn timeline(&self, field: &str) -> Vec<(usize, &'a Value)> {
        self.history
            .iter()
            .enumerate()
            .filter_map(|(version, snapshot)| snapshot.get(field).map(|v| (version, v)))
            .collect()
    }

    /// Generate a comprehensive audit report
    pub fn generate_report(&self) -> AuditReport {
        let changes = self.changes();
        let idle_updates = (1..self.history.len())
            .filter(|version| !changes.iter().any(|c| c.version == *version))
            .count();

        AuditReport {
            snapshot_count: self.history.len(),
            update_count: self.history.len().saturating_sub(1),
            idle_updates,
            total_changes: changes.len(),
            change_counts: self.change_counts(),
        }
    }
}

/// A summary of a store history
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Number of snapshots
    pub snapshot_count: usize,
    /// Number of updates after the initial state
    pub update_count: usize,
    /// Updates that left every field unchanged
    pub idle_updates: usize,
    /// Total number of field changes
    pub total_changes: usize,
    /// Changes per field
    pub change_counts: IndexMap<String, u64>,
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Audit Report ===")?;
        writeln!(f, "Snapshots: {}", self.snapshot_count)?;
        writeln!(f, "Updates: {}", self.update_count)?;
        writeln!(f, "Idle updates: {}", self.idle_updates)?;
        writeln!(f, "Field changes: {}", self.total_changes)?;

        if !self.change_counts.is_empty() {
            writeln!(f, "\nChanges by field:")?;
            let mut sorted: Vec<_> = self.change_counts.iter().collect();
            sorted.sort_by_key(|(_, count)| std::cmp::Reverse(**count));
            for (field, count) in sorted {
                writeln!(f, "  {}: {}", field, count)?;
            }
        }

        Ok(())
    }
}

/// Query criteria for filtering field changes
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// First version (inclusive)
    pub start_version: Option<usize>,
    /// Last version (inclusive)
    pub end_version: Option<usize>,
    /// Filter by field
    pub field: Option<String>,
    /// Filter by the value the field changed to
    pub to: Option<Value>,
}

impl AuditQuery {
    fn matches(&self, change: &FieldChange) -> bool {
        if self.start_version.is_some_and(|start| change.version < start) {
            return false;
        }
        if self.end_version.is_some_and(|end| change.version > end) {
            return false;
        }
        if let Some(ref field) = self.field {
            if *field != change.field {
                return false;
            }
        }
        if let Some(ref to) = self.to {
            if *to != change.to {
                return false;
            }
        }
        true
    }
}
