//! Contents and checkpoint routes.
//!
//! Checkpoint patterns overlap the generic `/api/contents(.*)` patterns of
//! the same method and are therefore registered first.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::routes::with_service;
use crate::routing::params::{self, ParamError};
use crate::routing::{Captures, PatternError, Router};
use crate::services::contents::{ContentType, NewUntitled, SaveOptions};
use crate::services::Contents;

pub const CHECKPOINTS: &str = "/api/contents/(.+)/checkpoints";
pub const CHECKPOINT: &str = "/api/contents/(.+)/checkpoints/(.*)";
pub const CONTENTS: &str = "/api/contents(.*)";
pub const CONTENTS_ENTRY: &str = "/api/contents/(.+)";

pub fn register(router: &mut Router, contents: &Arc<dyn Contents>) -> Result<(), PatternError> {
    router
        .get(CHECKPOINTS, with_service(contents, list_checkpoints))?
        .post(CHECKPOINT, with_service(contents, restore_checkpoint))?
        .post(CHECKPOINTS, with_service(contents, create_checkpoint))?
        .delete(CHECKPOINT, with_service(contents, delete_checkpoint))?
        .get(CONTENTS, with_service(contents, get))?
        .post(CONTENTS, with_service(contents, create))?
        .patch(CONTENTS, with_service(contents, rename))?
        .put(CONTENTS_ENTRY, with_service(contents, save))?
        .delete(CONTENTS_ENTRY, with_service(contents, delete))?;
    Ok(())
}

async fn list_checkpoints(contents: Arc<dyn Contents>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let checkpoints = contents.list_checkpoints(caps.get(0)).await?;
    Ok(Response::json(&checkpoints)?)
}

async fn restore_checkpoint(contents: Arc<dyn Contents>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let checkpoint_id = params::required(caps.get(1), "checkpoint id")?;
    contents.restore_checkpoint(caps.get(0), checkpoint_id).await?;
    Ok(Response::empty(StatusCode::NO_CONTENT))
}

async fn create_checkpoint(contents: Arc<dyn Contents>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let checkpoint = contents.create_checkpoint(caps.get(0)).await?;
    Ok(Response::json(&checkpoint)?.with_status(StatusCode::CREATED))
}

async fn delete_checkpoint(contents: Arc<dyn Contents>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let checkpoint_id = params::required(caps.get(1), "checkpoint id")?;
    contents.delete_checkpoint(caps.get(0), checkpoint_id).await?;
    Ok(Response::empty(StatusCode::NO_CONTENT))
}

async fn get(contents: Arc<dyn Contents>, req: Request, caps: Captures) -> ApiResult<Response> {
    let options = params::fetch_options(&req)?;
    let model = contents
        .get(params::contents_path(caps.get(0)), options)
        .await?;
    Ok(Response::json(&model)?)
}

/// Body of `POST /api/contents/{dir}`.
#[derive(Debug, Default, Deserialize)]
struct CreateBody {
    #[serde(default)]
    copy_from: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<ContentType>,
    #[serde(default)]
    ext: Option<String>,
}

async fn create(contents: Arc<dyn Contents>, req: Request, caps: Captures) -> ApiResult<Response> {
    let body: CreateBody = req.json()?;
    let dir = params::contents_path(caps.get(0));

    let model = match body.copy_from.as_deref().filter(|from| !from.is_empty()) {
        Some(from) => contents.copy(params::contents_path(from), dir).await?,
        None => {
            contents
                .new_untitled(NewUntitled {
                    path: body.path.unwrap_or_else(|| dir.to_string()),
                    kind: body.kind,
                    ext: body.ext,
                })
                .await?
        }
    };
    Ok(Response::json(&model)?.with_status(StatusCode::CREATED))
}

/// Body of `PATCH /api/contents/{path}`.
#[derive(Debug, Default, Deserialize)]
struct RenameBody {
    #[serde(default)]
    path: String,
}

async fn rename(contents: Arc<dyn Contents>, req: Request, caps: Captures) -> ApiResult<Response> {
    let body: RenameBody = req.json()?;
    let path = params::contents_path(caps.get(0));
    if path.is_empty() {
        return Err(ParamError::Missing("path").into());
    }
    let new_path = params::required(&body.path, "new path")?;

    let model = contents.rename(path, new_path).await?;
    Ok(Response::json(&model)?)
}

async fn save(contents: Arc<dyn Contents>, req: Request, caps: Captures) -> ApiResult<Response> {
    let options: SaveOptions = req.json()?;
    let model = contents.save(caps.get(0), options).await?;
    Ok(Response::json(&model)?)
}

async fn delete(contents: Arc<dyn Contents>, _req: Request, caps: Captures) -> ApiResult<Response> {
    contents.delete(caps.get(0)).await?;
    Ok(Response::empty(StatusCode::NO_CONTENT))
}
