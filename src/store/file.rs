//! Directory-backed rule store: one TOML file per rule set.
//!
//! ```toml
//! namespace = "shop"
//! name = "frontend"
//! created = 12
//!
//! [[rules]]
//! host = "shop.example.com"
//! path = "/"
//! path_type = "Prefix"
//! backend = { service = "frontend", port = 80 }
//! ```
//!
//! Any unreadable or unparseable file fails the whole snapshot so a
//! half-written file never withdraws a rule set by accident.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::routing::rule::RuleSet;
use crate::store::{RuleStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileRuleStore {
    directory: PathBuf,
}

impl FileRuleStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn rule_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.directory.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Parse one rule set file.
pub fn load_rule_set(path: &Path) -> Result<RuleSet, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl RuleStore for FileRuleStore {
    fn list_rule_sets(&self) -> Result<Vec<RuleSet>, StoreError> {
        let mut seen = HashSet::new();
        let mut rule_sets = Vec::new();

        for path in self.rule_files()? {
            let rule_set = load_rule_set(&path)?;
            if !seen.insert(rule_set.key()) {
                return Err(StoreError::Duplicate(rule_set.key()));
            }
            rule_sets.push(rule_set);
        }

        tracing::debug!(
            directory = %self.directory.display(),
            rule_sets = rule_sets.len(),
            "Loaded rule sets"
        );
        Ok(rule_sets)
    }
}
