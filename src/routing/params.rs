//! Typed decoding of captures and query values.
//!
//! # Responsibilities
//! - Turn capture strings and query values into typed parameters
//! - Reject malformed values explicitly instead of falling through
//!
//! # Design Decisions
//! - Runs inside handlers, immediately after dispatch
//! - Flags accept exactly `1` and `0`; absence means `false`
//! - Errors carry the parameter name so the adapter can report a 400

use std::str::FromStr;

use thiserror::Error;

use crate::http::Request;
use crate::services::contents::{ContentType, FetchOptions, FileFormat};

/// A capture or query value that failed to decode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid value {value:?} for flag {name}")]
    InvalidFlag { name: &'static str, value: String },

    #[error("invalid {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("missing {0}")]
    Missing(&'static str),
}

/// Decode a `0`/`1` query flag.
pub fn flag(request: &Request, name: &'static str) -> Result<bool, ParamError> {
    match request.query_param(name) {
        None | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(other) => Err(ParamError::InvalidFlag {
            name,
            value: other.to_string(),
        }),
    }
}

/// Decode an optional query value with `FromStr`.
pub fn optional<T: FromStr>(request: &Request, name: &'static str) -> Result<Option<T>, ParamError> {
    request
        .query_param(name)
        .map(|value| {
            value.parse().map_err(|_| ParamError::InvalidValue {
                name,
                value: value.to_string(),
            })
        })
        .transpose()
}

/// Contents path from a capture: the leading `/` is not part of the path.
pub fn contents_path(capture: &str) -> &str {
    capture.strip_prefix('/').unwrap_or(capture)
}

/// A capture that must not be empty (kernel, session or checkpoint id).
pub fn required<'a>(capture: &'a str, name: &'static str) -> Result<&'a str, ParamError> {
    if capture.is_empty() {
        Err(ParamError::Missing(name))
    } else {
        Ok(capture)
    }
}

/// Translation locale; an empty capture selects every language pack.
pub fn locale(capture: &str) -> &str {
    if capture.is_empty() {
        "all"
    } else {
        capture
    }
}

/// `?content=1&type=...&format=...` on a contents GET.
pub fn fetch_options(request: &Request) -> Result<FetchOptions, ParamError> {
    Ok(FetchOptions {
        content: flag(request, "content")?,
        kind: optional::<ContentType>(request, "type")?,
        format: optional::<FileFormat>(request, "format")?,
    })
}
