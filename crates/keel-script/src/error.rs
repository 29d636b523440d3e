//! Error types for keel-script

use thiserror::Error;

/// Config loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error("Store error: {0}")]
    Core(#[from] keel_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
