//! Keel Script - RON config loader
//!
//! Loads store construction records from RON documents:
//! - Field declarations with initial values
//! - Named expressions
//! - Rules
//!
//! Several documents can be merged into one config, so a store's fields,
//! expressions and rules may live in separate files.

mod error;
mod loader;

pub use error::{Error, Result};
pub use loader::Loader;
