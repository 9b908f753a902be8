//! Content store interface.
//!
//! The content store is hierarchical storage of notebooks, files and
//! directories addressed by `/`-separated paths relative to the store root.
//! Both the contents routes and the drive bridge talk to it through
//! [`Contents`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Kind of entry in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Notebook,
    File,
    Directory,
}

impl ContentType {
    pub fn is_dir(&self) -> bool {
        matches!(self, ContentType::Directory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Notebook => "notebook",
            ContentType::File => "file",
            ContentType::Directory => "directory",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notebook" => Ok(ContentType::Notebook),
            "file" => Ok(ContentType::File),
            "directory" => Ok(ContentType::Directory),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization format of an entry's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Text,
    Base64,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Text => "text",
            FileFormat::Base64 => "base64",
        }
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(FileFormat::Json),
            "text" => Ok(FileFormat::Text),
            "base64" => Ok(FileFormat::Base64),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry as returned by the store.
///
/// For directories fetched with content, `content` is an array of child
/// models (themselves without content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub created: String,
    pub last_modified: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub format: Option<FileFormat>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default = "default_writable")]
    pub writable: bool,
}

fn default_writable() -> bool {
    true
}

impl Model {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Names of the children, when this is a directory fetched with content.
    pub fn child_names(&self) -> Option<Vec<String>> {
        if !self.is_dir() {
            return None;
        }
        let children = self.content.as_array()?;
        Some(
            children
                .iter()
                .filter_map(|child| child.get("name").and_then(Value::as_str))
                .map(str::to_owned)
                .collect(),
        )
    }
}

/// Options for [`Contents::get`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Include the content (directory listing or file body).
    pub content: bool,
    /// Expected entry type, if the caller knows it.
    pub kind: Option<ContentType>,
    /// Requested content format.
    pub format: Option<FileFormat>,
}

impl FetchOptions {
    pub fn with_content() -> Self {
        Self {
            content: true,
            ..Self::default()
        }
    }
}

/// Options for [`Contents::new_untitled`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUntitled {
    /// Directory to create the entry in.
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: Option<ContentType>,
    /// Extension including the leading dot, e.g. `.py`.
    #[serde(default)]
    pub ext: Option<String>,
}

/// Payload for [`Contents::save`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveOptions {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<ContentType>,
    #[serde(default)]
    pub format: Option<FileFormat>,
}

/// A stored snapshot of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub last_modified: String,
}

/// Errors raised by a content store.
#[derive(Debug, Error)]
pub enum ContentsError {
    /// Path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Target path is already taken.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Path cannot be used (e.g. the store root).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Checkpoint id unknown for this path.
    #[error("checkpoint {id} not found for {path}")]
    CheckpointNotFound { path: String, id: String },

    /// Backend failure.
    #[error("{0}")]
    Other(String),
}

impl ContentsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentsError::NotFound(_) | ContentsError::CheckpointNotFound { .. }
        )
    }
}

pub type ContentsResult<T> = Result<T, ContentsError>;

/// Hierarchical content store.
#[async_trait]
pub trait Contents: Send + Sync {
    /// Fetch an entry.
    async fn get(&self, path: &str, options: FetchOptions) -> ContentsResult<Model>;

    /// Delete an entry (recursively for directories).
    async fn delete(&self, path: &str) -> ContentsResult<()>;

    /// Move an entry to `new_path`.
    async fn rename(&self, path: &str, new_path: &str) -> ContentsResult<Model>;

    /// Create a new entry with a generated name.
    async fn new_untitled(&self, options: NewUntitled) -> ContentsResult<Model>;

    /// Create or overwrite an entry.
    async fn save(&self, path: &str, options: SaveOptions) -> ContentsResult<Model>;

    /// Copy a file into `to_dir`, picking a free name.
    async fn copy(&self, path: &str, to_dir: &str) -> ContentsResult<Model>;

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<Checkpoint>;

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<Checkpoint>>;

    async fn restore_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()>;

    async fn delete_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()>;
}

/// Parent directory of a normalized path (`""` for top-level entries).
pub(crate) fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Last segment of a normalized path.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Split a file name into stem and extension (extension keeps its dot).
pub(crate) fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}
