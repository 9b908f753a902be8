//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query, body)
//!     → router.rs (scan registrations of the same method, in order)
//!     → matcher.rs (anchored pattern test, capture extraction)
//!     → handler(request, captures)
//!     → params.rs (typed decoding inside the handler)
//!     → Return: Response, NoMatch, or the handler's error
//!
//! Route Setup (at startup):
//!     routes::register_all
//!     → compile patterns (fatal on malformed template)
//!     → freeze as Arc<Router>
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod params;
pub mod router;

pub use matcher::{Captures, PatternError, PatternMatcher};
pub use router::{Handler, Route, Router};
