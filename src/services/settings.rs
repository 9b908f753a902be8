//! Settings and translation services.

use async_trait::async_trait;
use serde_json::Value;

use crate::services::ServiceResult;

/// Per-plugin user settings.
#[async_trait]
pub trait Settings: Send + Sync {
    async fn get(&self, plugin_id: &str) -> ServiceResult<Value>;

    /// Store the raw (JSON5 text) settings of a plugin.
    async fn save(&self, plugin_id: &str, raw: &str) -> ServiceResult<()>;

    async fn get_all(&self) -> ServiceResult<Value>;
}

/// Language packs.
#[async_trait]
pub trait Translation: Send + Sync {
    /// Translation data for `locale`; `all` lists available packs.
    async fn get(&self, locale: &str) -> ServiceResult<Value>;
}
