//! Notebook server core: a pattern router for the REST surface and a
//! message-driven bridge exposing the content store as a filesystem.

pub mod config;
pub mod drive;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routes;
pub mod routing;
pub mod services;

pub use config::ServerConfig;
pub use drive::{DriveBridge, DriveClient};
pub use error::{ApiError, ApiResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Router;
