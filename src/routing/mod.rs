//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Table Compilation (on every rule set change):
//!     RuleSet[]
//!     → rule.rs (validate & normalize)
//!     → collision.rs (one winner per host/path/type slot)
//!     → classifier.rs (sort by specificity)
//!     → builder.rs (freeze as immutable RoutingTable)
//!     → reconciler.rs (atomic publish via table.rs)
//!
//! Incoming Request (host, path)
//!     → table.rs (current snapshot)
//!     → matcher.rs (first accepting rule)
//!     → Return: Backend or NoMatch
//! ```
//!
//! # Design Decisions
//! - Deterministic: the same rule sets, in any order, give the same table
//! - First match wins; table order is the whole precedence story
//! - No regex in the hot path

pub mod builder;
pub mod classifier;
pub mod collision;
pub mod matcher;
pub mod path;
pub mod reconciler;
pub mod rule;
pub mod table;

pub use builder::{build, BuildOutput, RejectedRule};
pub use classifier::{classify, SpecificityKey};
pub use collision::{resolve, CollisionConflict};
pub use matcher::{match_route, RouteMatch};
pub use reconciler::{ReconcileError, ReconcileObserver, ReconcileSummary, TableReconciler, TracingObserver};
pub use rule::{Backend, BackendPort, Origin, PathType, Rule, RuleSet, RuleSpec, ValidationError};
pub use table::{RoutingTable, TableHandle};
