//! Settings and translation routes.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::routes::with_service;
use crate::routing::params;
use crate::routing::{Captures, PatternError, Router};
use crate::services::{Settings, Translation};

/// `@scope/package:plugin` or `package:plugin`; group 1 is the full id.
pub const PLUGIN: &str = "/api/settings/((?:@([^/]+?)[/])?([^/]+?):([^:]+))$";

pub fn register_settings(router: &mut Router, settings: &Arc<dyn Settings>) -> Result<(), PatternError> {
    router
        .get(PLUGIN, with_service(settings, get_plugin))?
        .put(PLUGIN, with_service(settings, save_plugin))?
        .get("/api/settings", with_service(settings, get_all))?;
    Ok(())
}

pub fn register_translations(
    router: &mut Router,
    translation: &Arc<dyn Translation>,
) -> Result<(), PatternError> {
    router.get("/api/translations/?(.*)", with_service(translation, get_translation))?;
    Ok(())
}

async fn get_plugin(settings: Arc<dyn Settings>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let setting = settings.get(caps.get(0)).await?;
    Ok(Response::json(&setting)?)
}

#[derive(Debug, Deserialize)]
struct SaveBody {
    raw: String,
}

async fn save_plugin(settings: Arc<dyn Settings>, req: Request, caps: Captures) -> ApiResult<Response> {
    let body: SaveBody = req.json()?;
    settings.save(caps.get(0), &body.raw).await?;
    Ok(Response::empty(StatusCode::NO_CONTENT))
}

async fn get_all(settings: Arc<dyn Settings>, _req: Request, _caps: Captures) -> ApiResult<Response> {
    let plugins = settings.get_all().await?;
    Ok(Response::json(&plugins)?)
}

async fn get_translation(
    translation: Arc<dyn Translation>,
    _req: Request,
    caps: Captures,
) -> ApiResult<Response> {
    let data = translation.get(params::locale(caps.get(0))).await?;
    Ok(Response::json(&data)?)
}
