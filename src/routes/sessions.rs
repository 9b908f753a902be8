//! Session routes.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;

use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::routes::with_service;
use crate::routing::params;
use crate::routing::{Captures, PatternError, Router};
use crate::services::Sessions;

pub fn register(router: &mut Router, sessions: &Arc<dyn Sessions>) -> Result<(), PatternError> {
    router
        .get("/api/sessions/(.+)", with_service(sessions, get))?
        .get("/api/sessions", with_service(sessions, list))?
        .patch("/api/sessions(.*)", with_service(sessions, patch))?
        .delete("/api/sessions/(.+)", with_service(sessions, shutdown))?
        .post("/api/sessions", with_service(sessions, start_new))?;
    Ok(())
}

async fn get(sessions: Arc<dyn Sessions>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let session = sessions.get(caps.get(0)).await?;
    Ok(Response::json(&session)?)
}

async fn list(sessions: Arc<dyn Sessions>, _req: Request, _caps: Captures) -> ApiResult<Response> {
    let list = sessions.list().await?;
    Ok(Response::json(&list)?)
}

async fn patch(sessions: Arc<dyn Sessions>, req: Request, _caps: Captures) -> ApiResult<Response> {
    let options: Value = req.json()?;
    let session = sessions.patch(options).await?;
    Ok(Response::json(&session)?)
}

async fn shutdown(sessions: Arc<dyn Sessions>, _req: Request, caps: Captures) -> ApiResult<Response> {
    let session_id = params::required(caps.get(0), "session id")?;
    sessions.shutdown(session_id).await?;
    Ok(Response::empty(StatusCode::NO_CONTENT))
}

async fn start_new(sessions: Arc<dyn Sessions>, req: Request, _caps: Captures) -> ApiResult<Response> {
    let options: Value = req.json()?;
    let session = sessions.start_new(options).await?;
    Ok(Response::json(&session)?.with_status(StatusCode::CREATED))
}
