//! Drive channel endpoint.
//!
//! Forwards one JSON drive message to the bridge and answers with its reply,
//! so a filesystem emulation outside the process can reach the bridge.

use std::sync::Arc;

use serde_json::Value;

use crate::drive::DriveClient;
use crate::error::ApiResult;
use crate::http::{Request, Response};
use crate::routes::with_service;
use crate::routing::{Captures, PatternError, Router};

/// Name of the channel the filesystem emulation posts to.
pub const DRIVE_CHANNEL: &str = "/api/drive.v1";

pub fn register(router: &mut Router, client: &Arc<DriveClient>) -> Result<(), PatternError> {
    router.post(&regex::escape(DRIVE_CHANNEL), with_service(client, forward))?;
    Ok(())
}

async fn forward(client: Arc<DriveClient>, req: Request, _caps: Captures) -> ApiResult<Response> {
    let message: Value = req.json()?;
    let reply = client.request_raw(message).await?;
    Ok(Response::json(&reply)?)
}
