//! External collaborators.
//!
//! # Data Flow
//! ```text
//! routes/* handlers ──┐
//!                     ├─→ Contents (hierarchical store)
//! drive bridge ───────┘
//! routes/* handlers ───→ Kernels / KernelSpecs / Sessions / Settings /
//!                        Translation / Licenses (opaque JSON services)
//! ```
//!
//! # Design Decisions
//! - Each collaborator is a narrow async trait; implementations live elsewhere
//! - Only the content store has a typed model; the rest exchange JSON values
//! - `memory` ships an ephemeral content store for tests and local runs

pub mod contents;
pub mod kernels;
pub mod licenses;
pub mod memory;
pub mod sessions;
pub mod settings;

use thiserror::Error;

pub use contents::{Contents, ContentsError, FetchOptions, Model};
pub use kernels::{KernelSpecs, Kernels};
pub use licenses::Licenses;
pub use memory::MemoryContents;
pub use sessions::Sessions;
pub use settings::{Settings, Translation};

/// Failure reported by one of the opaque services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed kernel, session or plugin does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service rejected the request payload.
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("{0}")]
    Other(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
