//! Kernel and kernelspec services.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::ServiceResult;

/// Running kernels.
#[async_trait]
pub trait Kernels: Send + Sync {
    /// Restart a kernel, returning its model.
    async fn restart(&self, kernel_id: &str) -> ServiceResult<Value>;

    /// Shut a kernel down and forget its id.
    async fn shutdown(&self, kernel_id: &str) -> ServiceResult<()>;
}

/// Installed kernel specs, as the kernelspec service reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelSpecsModel {
    pub default: String,
    /// Spec documents keyed by kernel name. A spec may carry `resources`.
    pub kernelspecs: BTreeMap<String, Value>,
}

/// Available kernel specs.
pub trait KernelSpecs: Send + Sync {
    /// `None` until the specs have been loaded.
    fn specs(&self) -> Option<KernelSpecsModel>;
}
