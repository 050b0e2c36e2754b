//! Ingress routing core.
//!
//! Turns independently authored, possibly overlapping rule sets into one
//! deterministic, precedence-ordered routing table, republishes it on every
//! change, and answers "which backend handles this (host, path)?" without
//! blocking.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::RouterConfig;
pub use routing::{Backend, PathType, RoutingTable, RuleSet, TableHandle, TableReconciler};
pub use store::{FileRuleStore, MemoryRuleStore, RuleStore};
