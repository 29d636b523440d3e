//! Error types for keel-journal

use thiserror::Error;

/// Journal error type
#[derive(Debug, Error)]
pub enum Error {
    /// History index out of range
    #[error("Invalid history index {index} (history has {len} entries)")]
    InvalidIndex { index: usize, len: usize },

    /// Export error
    #[error("Export error: {0}")]
    ExportError(String),

    /// Store rejected the restored history
    #[error("Store error: {0}")]
    Core(#[from] keel_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for journal operations
pub type Result<T> = std::result::Result<T, Error>;
