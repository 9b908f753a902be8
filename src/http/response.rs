//! Abstract response shape returned by route handlers.
//!
//! # Design Decisions
//! - Default status is 200
//! - The router never inspects a response; the adapter serializes it as-is
//! - 204 responses never carry a body

use axum::body::{Body as AxumBody, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::Value;

/// Response payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    Json(Value),
    Raw(Bytes),
}

/// An outgoing API response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub body: ResponseBody,
    pub headers: HeaderMap,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Empty,
            headers: HeaderMap::new(),
        }
    }
}

impl Response {
    /// 200 with a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            body: ResponseBody::Json(serde_json::to_value(value)?),
            ..Self::default()
        })
    }

    /// Empty body with the given status.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn body_json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let is_json = matches!(self.body, ResponseBody::Json(_));
        let body = match self.body {
            _ if self.status == StatusCode::NO_CONTENT => AxumBody::empty(),
            ResponseBody::Empty => AxumBody::empty(),
            ResponseBody::Json(value) => AxumBody::from(value.to_string()),
            ResponseBody::Raw(bytes) => AxumBody::from(bytes),
        };

        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if is_json && self.status != StatusCode::NO_CONTENT {
            response
                .headers_mut()
                .entry(header::CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("application/json"));
        }
        response
    }
}
