//! Handler-side error type.
//!
//! Route handlers return [`ApiError`]; the router passes it through untouched
//! and the HTTP adapter maps it to a status code.

use axum::http::StatusCode;
use thiserror::Error;

use crate::drive::ChannelError;
use crate::routing::params::ParamError;
use crate::services::{ContentsError, ServiceError};

/// Failure raised while handling a routed request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Contents(#[from] ContentsError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Param(#[from] ParamError),

    /// The drive bridge could not be reached.
    #[error(transparent)]
    Drive(#[from] ChannelError),

    /// Request body did not have the expected shape, or a reply failed to encode.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Status code the transport should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Contents(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Contents(ContentsError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Contents(ContentsError::NotADirectory(_))
            | ApiError::Contents(ContentsError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            ApiError::Contents(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Invalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Other(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Param(_) | ApiError::Json(_) => StatusCode::BAD_REQUEST,
            ApiError::Drive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
