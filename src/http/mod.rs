//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → server.rs (buffer body, decode query, build abstract Request)
//!     → routing::Router::dispatch
//!     → response.rs (abstract Response → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Body, Method, Request};
pub use response::{Response, ResponseBody};
pub use server::HttpServer;
