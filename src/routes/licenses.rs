//! Licenses and nbconvert routes.

use std::sync::Arc;

use serde_json::json;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::routes::with_service;
use crate::routing::{Captures, PatternError, Router};
use crate::services::Licenses;

pub fn register(router: &mut Router, licenses: &Arc<dyn Licenses>) -> Result<(), PatternError> {
    router.get("/api/licenses", with_service(licenses, get_licenses))?;
    Ok(())
}

/// No exporters are available in the browser; the listing is always empty.
pub fn register_nbconvert(router: &mut Router) -> Result<(), PatternError> {
    router.get("/api/nbconvert", nbconvert)?;
    Ok(())
}

async fn nbconvert(_req: Request, _caps: Captures) -> ApiResult<Response> {
    Ok(Response::json(&json!({}))?)
}

async fn get_licenses(licenses: Arc<dyn Licenses>, _req: Request, _caps: Captures) -> ApiResult<Response> {
    let report = licenses.get().await?;
    Ok(Response::json(&report)?)
}
