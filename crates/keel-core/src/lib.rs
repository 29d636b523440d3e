//! Keel Core - Reactive state container driven by sentence rules
//!
//! This crate provides the store and its rule language:
//! - Dynamic value types (`Value`, `ValueMap`)
//! - A sentence parser that compiles English-like rules into `Node` trees
//! - An interpreter that evaluates trees against current and previous state
//! - The `Store`, with history, rules, and change listeners
//!
//! ## Sentences
//!
//! Fields, named expressions, and rules are all written as short sentences:
//!
//! ```rust
//! use keel_core::{Store, StoreConfig, Value};
//!
//! let mut store = Store::new(
//!     StoreConfig::new()
//!         .with_field("page", "loading")
//!         .with_field("alert", Value::Null)
//!         .with_expression("rejected", "page was loading and page is login")
//!         .with_rule("if rejected then set alert try_again"),
//! )
//! .unwrap();
//!
//! store.update([("page", "login")]).unwrap();
//! assert_eq!(store.get("alert"), Some(&Value::from("try_again")));
//! ```
//!
//! Keywords, loosest first: `then`, `or`, `and`, `set`, `inc`, `was`,
//! `was not`, `is`, `is not`, `is now`, `is not now`, `has changed`,
//! `has not changed`, `greater than`, `less than`. A leading `if` is ignored.

mod config;
mod error;
mod keyword;
pub mod node;
pub mod parser;
mod payload;
mod snapshot;
mod store;
mod tokenizer;
mod value;

pub use config::StoreConfig;
pub use error::{Error, GrammarError, Result};
pub use keyword::{Keyword, KEYWORDS};
pub use node::{Comparison, Node, Scope, View};
pub use parser::{Expressions, FieldNames, Parser, MAX_REDUCTION_PASSES};
pub use payload::Payload;
pub use snapshot::Snapshot;
pub use store::{Listener, Store};
pub use tokenizer::{normalize_name, tokenize};
pub use value::{Value, ValueMap};
