//! Third-party license reports.

use async_trait::async_trait;
use serde_json::Value;

use crate::services::ServiceResult;

#[async_trait]
pub trait Licenses: Send + Sync {
    async fn get(&self) -> ServiceResult<Value>;
}
