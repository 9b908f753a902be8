//! Drive bridge wire format.
//!
//! # Responsibilities
//! - Define the inbound message shape and the replies posted back
//! - Decode a raw message into a typed `DriveCommand` exactly once
//!
//! # Design Decisions
//! - Malformed messages never reach the store; the bridge answers `null`
//! - Field names and mode sentinels match what the in-browser filesystem
//!   emulation expects, so replies serialize without renaming

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::services::contents::FileFormat;

/// Mode reported for directories (`0o40777`).
pub const DIR_MODE: u32 = 16895;

/// Mode reported for files and notebooks (`0o100666`).
pub const FILE_MODE: u32 = 33206;

/// Inbound message as posted by the filesystem emulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveRequest {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DriveRequest {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            args: None,
            content: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Why an inbound message could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message does not match the drive request shape: {0}")]
    Shape(String),

    #[error("unknown drive method: {0}")]
    UnknownMethod(String),

    #[error("{0} requires arguments")]
    MissingArgs(&'static str),

    #[error("invalid argument for {method}: {value:?}")]
    InvalidArg { method: &'static str, value: String },
}

/// A decoded drive operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveOperation {
    Readdir,
    Rmdir,
    Rename { new_path: String },
    Getmode,
    Lookup,
    Mknod { mode: u32 },
    Getattr,
    Get,
    Put { format: FileFormat, content: String },
}

impl DriveOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Readdir => "readdir",
            Self::Rmdir => "rmdir",
            Self::Rename { .. } => "rename",
            Self::Getmode => "getmode",
            Self::Lookup => "lookup",
            Self::Mknod { .. } => "mknod",
            Self::Getattr => "getattr",
            Self::Get => "get",
            Self::Put { .. } => "put",
        }
    }
}

/// A decoded message: the raw (unresolved) path and the operation on it.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveCommand {
    pub path: String,
    pub operation: DriveOperation,
}

impl DriveCommand {
    /// Decode a raw channel message.
    pub fn decode(message: Value) -> Result<Self, DecodeError> {
        let request: DriveRequest =
            serde_json::from_value(message).map_err(|e| DecodeError::Shape(e.to_string()))?;
        Self::try_from(request)
    }
}

impl TryFrom<DriveRequest> for DriveCommand {
    type Error = DecodeError;

    fn try_from(request: DriveRequest) -> Result<Self, Self::Error> {
        let DriveRequest {
            path,
            method,
            args,
            content,
        } = request;

        let operation = match method.as_str() {
            "readdir" => DriveOperation::Readdir,
            "rmdir" => DriveOperation::Rmdir,
            "getmode" => DriveOperation::Getmode,
            "lookup" => DriveOperation::Lookup,
            "getattr" => DriveOperation::Getattr,
            "get" => DriveOperation::Get,
            "rename" => DriveOperation::Rename {
                new_path: first_arg(args, "rename")?,
            },
            "mknod" => {
                let value = first_arg(args, "mknod")?;
                let mode = u32::from_str(value.trim()).map_err(|_| DecodeError::InvalidArg {
                    method: "mknod",
                    value: value.clone(),
                })?;
                DriveOperation::Mknod { mode }
            }
            "put" => {
                let value = first_arg(args, "put")?;
                let format = FileFormat::from_str(&value)
                    .map_err(|_| DecodeError::InvalidArg { method: "put", value })?;
                DriveOperation::Put {
                    format,
                    content: content.unwrap_or_default(),
                }
            }
            _ => return Err(DecodeError::UnknownMethod(method)),
        };

        Ok(Self { path, operation })
    }
}

fn first_arg(args: Option<Vec<String>>, method: &'static str) -> Result<String, DecodeError> {
    args.and_then(|args| args.into_iter().next())
        .ok_or(DecodeError::MissingArgs(method))
}

/// `stat`-like attributes of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub dev: u32,
    pub ino: u32,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub blksize: u32,
    pub blocks: u32,
    pub atime: String,
    pub mtime: String,
    pub ctime: String,
    pub timestamp: u64,
}

/// Reply posted back for one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DriveReply {
    /// Serialized as `null`.
    Null,
    Names(Vec<String>),
    Mode(u32),
    Lookup {
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
    },
    Stat(Stat),
    /// `json` content arrives stringified; other content passes through.
    File {
        content: Value,
        format: Option<FileFormat>,
    },
}

impl DriveReply {
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
