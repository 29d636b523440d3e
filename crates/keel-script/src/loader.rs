//! RON config loader

use crate::error::{Error, Result};
use keel_core::{normalize_name, Store, StoreConfig};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loader for RON store configs
///
/// Every loaded document is merged into one [`StoreConfig`]: fields and
/// expressions must be unique across documents, rules are appended in
/// load order.
pub struct Loader {
    config: StoreConfig,
    /// Folded field and expression names seen so far
    names: HashSet<String>,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config: StoreConfig::new(),
            names: HashSet::new(),
        }
    }

    /// Load a config document from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let document: StoreConfig = ron::from_str(content)?;
        self.merge(document)
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.load_str(&content)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(())
    }

    /// Load all RON files from a directory
    ///
    /// Subdirectories are loaded recursively. Entries are visited in path
    /// order so rules keep a stable order between runs.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    fn merge(&mut self, document: StoreConfig) -> Result<()> {
        let StoreConfig {
            data,
            expressions,
            rules,
        } = document;

        // A rejected document leaves no names behind
        let mut incoming = HashSet::new();
        for name in data.keys().chain(expressions.keys()) {
            let folded = normalize_name(name);
            if self.names.contains(&folded) || !incoming.insert(folded) {
                return Err(Error::DuplicateDefinition(name.clone()));
            }
        }
        self.names.extend(incoming);

        debug!(
            fields = data.len(),
            expressions = expressions.len(),
            rules = rules.len(),
            "merged config document"
        );
        self.config.data.extend(data);
        self.config.expressions.extend(expressions);
        self.config.rules.extend(rules);
        Ok(())
    }

    /// Finish loading and return the merged config
    pub fn finish(self) -> StoreConfig {
        self.config
    }

    /// Finish loading and build a store from the merged config
    pub fn build(self) -> Result<Store> {
        Ok(Store::new(self.config)?)
    }

    /// Get the current config (for inspection during loading)
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
