//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → HTTP server drains → drive bridge stops → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup in the binary: config, logging, store, routes, listeners
//! - Long-running tasks subscribe to one broadcast coordinator

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
