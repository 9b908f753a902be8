//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single fallback handler
//! - Wire up middleware (tracing, timeout)
//! - Convert wire requests into the abstract `Request` shape
//! - Dispatch to the routing engine and map outcomes to status codes
//! - Bind server to listener and drain on shutdown
//!
//! # Design Decisions
//! - Axum does no routing of its own; the pattern router decides everything
//! - Methods outside the routed vocabulary are answered like unmatched paths
//! - Bodies are buffered up to a fixed limit before dispatch

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::LimitsConfig;
use crate::http::request::{Body, Method, Request};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::Router as ApiRouter;

/// Application state injected into the fallback handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ApiRouter>,
    pub max_body_bytes: usize,
}

/// HTTP front end for the pattern router.
pub struct HttpServer {
    router: axum::Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `api`.
    pub fn new(limits: &LimitsConfig, api: Arc<ApiRouter>) -> Self {
        let state = AppState {
            router: api,
            max_body_bytes: limits.max_body_bytes,
        };
        Self {
            router: Self::build_router(limits, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(limits: &LimitsConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(api_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(limits.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled service, for driving without a socket.
    pub fn into_router(self) -> axum::Router {
        self.router
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request lands here.
async fn api_handler(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> axum::response::Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let method_label = parts.method.to_string();

    let response = handle(&state, parts, body).await;

    metrics::record_request(&method_label, response.status().as_u16(), start_time);
    response
}

async fn handle(state: &AppState, parts: Parts, body: AxumBody) -> axum::response::Response {
    let Ok(method) = Method::try_from(&parts.method) else {
        tracing::debug!(method = %parts.method, "Unsupported method");
        return error_response(StatusCode::NOT_FOUND, "not found");
    };

    let bytes = match Limited::new(body, state.max_body_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            tracing::warn!(limit = state.max_body_bytes, "Request body exceeded limit");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return error_response(StatusCode::BAD_REQUEST, "failed to read request body");
        }
    };

    let request = Request {
        method,
        path: decode_path(parts.uri.path()),
        query: parts
            .uri
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect::<BTreeMap<_, _>>()
            })
            .unwrap_or_default(),
        body: Body::from_bytes(bytes),
    };
    let path = request.path.clone();

    match state.router.dispatch(request).await {
        Ok(Some(response)) => response.into_response(),
        Ok(None) => {
            tracing::warn!(method = %method, path = %path, "No route matched");
            error_response(StatusCode::NOT_FOUND, "not found")
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::error!(method = %method, path = %path, error = %e, "Handler failed");
            } else {
                tracing::debug!(method = %method, path = %path, error = %e, "Request rejected");
            }
            error_response(status, &e.to_string())
        }
    }
}

fn decode_path(raw: &str) -> String {
    percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map(|path| path.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "message": message }))).into_response()
}
