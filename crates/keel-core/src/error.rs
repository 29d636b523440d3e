//! Error types for keel-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to compile \"{sentence}\": {source}")]
    Compile {
        sentence: String,
        #[source]
        source: GrammarError,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    #[error("Name \"{0}\" is an operator keyword")]
    ReservedName(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("History must contain at least one snapshot")]
    EmptyHistory,

    #[error("Snapshot {index} does not match the declared fields")]
    SnapshotMismatch { index: usize },
}

/// Errors raised while assembling a sentence into a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("sentence is empty")]
    Empty,

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("operator \"{keyword}\" is missing an operand")]
    MissingOperand { keyword: &'static str },

    #[error("ambiguous nesting of \"{keyword}\"; split the sentence or use a named expression")]
    Ambiguous { keyword: &'static str },

    #[error("placeholder cannot be an operand of \"{keyword}\"")]
    MisplacedPlaceholder { keyword: &'static str },

    #[error("\"{keyword}\" needs a field on its left, found {found}")]
    NotAssignable { keyword: &'static str, found: String },

    #[error("cannot resolve tree [{}] within {passes} passes", kinds.join(", "))]
    Unresolved { kinds: Vec<String>, passes: usize },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
