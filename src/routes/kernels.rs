//! Kernel and kernelspec routes.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::routes::with_service;
use crate::routing::params;
use crate::routing::{Captures, PatternError, Router};
use crate::services::{KernelSpecs, Kernels};

pub fn register_kernels(router: &mut Router, kernels: &Arc<dyn Kernels>) -> Result<(), PatternError> {
    router
        .post("/api/kernels/(.*)/restart", with_service(kernels, restart))?
        .delete("/api/kernels/(.*)", with_service(kernels, shutdown))?;
    Ok(())
}

pub fn register_kernelspecs(
    router: &mut Router,
    kernelspecs: &Arc<dyn KernelSpecs>,
) -> Result<(), PatternError> {
    router.get("/api/kernelspecs", with_service(kernelspecs, list_kernelspecs))?;
    Ok(())
}

async fn restart(kernels: Arc<dyn Kernels>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let kernel_id = params::required(caps.get(0), "kernel id")?;
    let model = kernels.restart(kernel_id).await?;
    Ok(Response::json(&model)?)
}

async fn shutdown(kernels: Arc<dyn Kernels>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let kernel_id = params::required(caps.get(0), "kernel id")?;
    kernels.shutdown(kernel_id).await?;
    Ok(Response::empty(StatusCode::NO_CONTENT))
}

/// One entry of the kernelspecs listing, in Jupyter Server's layout.
#[derive(Debug, Serialize)]
struct KernelSpecEntry {
    name: String,
    spec: Value,
    resources: Option<Value>,
}

#[derive(Debug, Serialize)]
struct KernelSpecListing {
    default: String,
    kernelspecs: BTreeMap<String, KernelSpecEntry>,
}

async fn list_kernelspecs(
    kernelspecs: Arc<dyn KernelSpecs>,
    _req: Request,
    _caps: Captures,
) -> ApiResult<Response> {
    let Some(specs) = kernelspecs.specs() else {
        return Ok(Response::empty(StatusCode::OK));
    };

    let listing = KernelSpecListing {
        default: specs.default,
        kernelspecs: specs
            .kernelspecs
            .into_iter()
            .map(|(name, spec)| {
                let resources = spec.get("resources").cloned();
                let entry = KernelSpecEntry {
                    name: name.clone(),
                    spec,
                    resources,
                };
                (name, entry)
            })
            .collect(),
    };
    Ok(Response::json(&listing)?)
}
