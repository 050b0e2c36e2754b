//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace layer, graceful shutdown)
//!     → admin (diagnostics, lookups, forced rebuilds)
//! ```

pub mod server;

pub use server::HttpServer;
