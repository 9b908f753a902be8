//! Session service.

use async_trait::async_trait;
use serde_json::Value;

use crate::services::ServiceResult;

/// Notebook sessions binding a path to a kernel.
#[async_trait]
pub trait Sessions: Send + Sync {
    async fn get(&self, session_id: &str) -> ServiceResult<Value>;

    async fn list(&self) -> ServiceResult<Value>;

    /// Update a session (rename, change kernel) from a partial model.
    async fn patch(&self, options: Value) -> ServiceResult<Value>;

    async fn shutdown(&self, session_id: &str) -> ServiceResult<()>;

    /// Start a session, or return the existing one for the same path.
    async fn start_new(&self, options: Value) -> ServiceResult<Value>;
}
