//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load rules → First reconcile → Start watcher & reconciler → Start admin API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Reconciler loop exits → Admin API drains → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger a full rule resync
//! ```
//!
//! # Design Decisions
//! - Ordered startup: a table is published before the admin API answers
//! - Startup continues with an empty table if the first snapshot fails

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
