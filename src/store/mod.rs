//! Rule store collaborators.
//!
//! # Data Flow
//! ```text
//! rules directory / in-process API
//!     → file.rs | memory.rs (RuleStore: full snapshots)
//!     → watcher.rs | memory.rs notifier (ChangeEvent triggers)
//!     → routing::reconciler
//! ```
//!
//! # Design Decisions
//! - The core only ever asks for a full snapshot; events carry no diff
//! - Store reads are synchronous and bounded; waiting for changes is the
//!   store's concern

pub mod file;
pub mod memory;
pub mod watcher;

use std::path::PathBuf;

use crate::routing::rule::RuleSet;

pub use file::FileRuleStore;
pub use memory::MemoryRuleStore;
pub use watcher::RulesWatcher;

/// Source of the full rule set collection.
pub trait RuleStore: Send + Sync {
    fn list_rule_sets(&self) -> Result<Vec<RuleSet>, StoreError>;
}

/// The snapshot could not be read. The caller keeps its current table.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("rule set {0} is declared more than once")]
    Duplicate(String),

    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Admitted,
    Updated,
    Withdrawn,
    /// Something changed, details unknown.
    Resync,
}

/// Trigger for a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Rule set key or file path, for logs.
    pub source: Option<String>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, source: Option<String>) -> Self {
        Self { kind, source }
    }

    pub fn resync() -> Self {
        Self::new(ChangeKind::Resync, None)
    }
}
