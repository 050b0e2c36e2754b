//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! reconciler / admin API produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Conflicts and rejected rules are never fatal; they surface here
//! - Metric updates are cheap enough for the match path

pub mod logging;
pub mod metrics;
