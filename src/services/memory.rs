//! In-memory content store.
//!
//! Used by the development binary and tests. All data is ephemeral.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::contents::{
    Checkpoint, ContentType, Contents, ContentsError, ContentsResult, FetchOptions, FileFormat,
    Model, NewUntitled, SaveOptions,
};
use crate::services::contents::{basename, dirname, split_ext};

/// Default number of checkpoints retained per file.
pub const DEFAULT_MAX_CHECKPOINTS: usize = 5;

#[derive(Debug, Clone)]
struct Entry {
    kind: ContentType,
    content: Value,
    format: Option<FileFormat>,
    mimetype: Option<String>,
    created: String,
    last_modified: String,
}

impl Entry {
    fn directory() -> Self {
        let now = timestamp();
        Self {
            kind: ContentType::Directory,
            content: Value::Null,
            format: Some(FileFormat::Json),
            mimetype: None,
            created: now.clone(),
            last_modified: now,
        }
    }

    fn size(&self) -> Option<u64> {
        match (&self.kind, &self.content) {
            (ContentType::Directory, _) => None,
            (_, Value::Null) => Some(0),
            (_, Value::String(s)) if self.format == Some(FileFormat::Base64) => {
                let padding = s.bytes().rev().take_while(|b| *b == b'=').count();
                Some((s.len() / 4 * 3).saturating_sub(padding) as u64)
            }
            (_, Value::String(s)) => Some(s.len() as u64),
            (_, other) => Some(other.to_string().len() as u64),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCheckpoint {
    checkpoint: Checkpoint,
    content: Value,
    format: Option<FileFormat>,
}

/// In-memory content store.
///
/// Thread-safe via internal `RwLock`. The root directory (`""`) always exists.
#[derive(Debug)]
pub struct MemoryContents {
    entries: RwLock<BTreeMap<String, Entry>>,
    checkpoints: DashMap<String, Vec<StoredCheckpoint>>,
    max_checkpoints: usize,
}

impl Default for MemoryContents {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContents {
    pub fn new() -> Self {
        Self::with_max_checkpoints(DEFAULT_MAX_CHECKPOINTS)
    }

    pub fn with_max_checkpoints(max_checkpoints: usize) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(String::new(), Entry::directory());
        Self {
            entries: RwLock::new(entries),
            checkpoints: DashMap::new(),
            max_checkpoints: max_checkpoints.max(1),
        }
    }

    /// Normalize a path: drop empty segments and surrounding slashes.
    fn normalize(path: &str) -> String {
        path.split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/")
    }

    fn model(entries: &BTreeMap<String, Entry>, path: &str, entry: &Entry, content: bool) -> Model {
        let content = match (content, entry.kind) {
            (false, _) => Value::Null,
            (true, ContentType::Directory) => Value::Array(
                Self::children(entries, path)
                    .map(|(child_path, child)| {
                        let model = Self::model(entries, child_path, child, false);
                        serde_json::to_value(model).unwrap_or(Value::Null)
                    })
                    .collect(),
            ),
            (true, _) => entry.content.clone(),
        };

        Model {
            name: basename(path).to_string(),
            path: path.to_string(),
            kind: entry.kind,
            created: entry.created.clone(),
            last_modified: entry.last_modified.clone(),
            content,
            format: entry.format,
            mimetype: entry.mimetype.clone(),
            size: entry.size(),
            writable: true,
        }
    }

    fn children<'a>(
        entries: &'a BTreeMap<String, Entry>,
        dir: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Entry)> + 'a {
        entries
            .iter()
            .filter(move |(path, _)| !path.is_empty() && dirname(path) == dir)
    }

    fn ensure_dir(entries: &BTreeMap<String, Entry>, dir: &str) -> ContentsResult<()> {
        match entries.get(dir) {
            Some(entry) if entry.kind.is_dir() => Ok(()),
            Some(_) => Err(ContentsError::NotADirectory(dir.to_string())),
            None => Err(ContentsError::not_found(dir)),
        }
    }

    fn is_within(path: &str, root: &str) -> bool {
        path == root || path.starts_with(&format!("{}/", root))
    }

    /// First free `{dir}/{stem}{n}{ext}`; `n` starts at `start`, where 0 means no suffix.
    fn free_name(
        entries: &BTreeMap<String, Entry>,
        dir: &str,
        stem: &str,
        ext: &str,
        start: usize,
    ) -> String {
        (start..)
            .map(|n| if n == 0 { String::new() } else { n.to_string() })
            .map(|suffix| join(dir, &format!("{}{}{}", stem, suffix, ext)))
            .find(|path| !entries.contains_key(path))
            .unwrap_or_default()
    }

    fn write_lock(
        &self,
    ) -> ContentsResult<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|_| ContentsError::Other("lock poisoned".to_string()))
    }

    fn read_lock(&self) -> ContentsResult<std::sync::RwLockReadGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|_| ContentsError::Other("lock poisoned".to_string()))
    }
}

#[async_trait]
impl Contents for MemoryContents {
    async fn get(&self, path: &str, options: FetchOptions) -> ContentsResult<Model> {
        let path = Self::normalize(path);
        let entries = self.read_lock()?;
        let entry = entries
            .get(&path)
            .ok_or_else(|| ContentsError::not_found(&path))?;

        if options.kind == Some(ContentType::Directory) && !entry.kind.is_dir() {
            return Err(ContentsError::NotADirectory(path));
        }
        Ok(Self::model(&entries, &path, entry, options.content))
    }

    async fn delete(&self, path: &str) -> ContentsResult<()> {
        let path = Self::normalize(path);
        if path.is_empty() {
            return Err(ContentsError::InvalidPath("cannot delete the root".to_string()));
        }

        let mut entries = self.write_lock()?;
        if !entries.contains_key(&path) {
            return Err(ContentsError::not_found(path));
        }
        entries.retain(|key, _| !Self::is_within(key, &path));
        self.checkpoints.retain(|key, _| !Self::is_within(key, &path));

        tracing::debug!(path = %path, "Deleted entry");
        Ok(())
    }

    async fn rename(&self, path: &str, new_path: &str) -> ContentsResult<Model> {
        let path = Self::normalize(path);
        let new_path = Self::normalize(new_path);
        if path.is_empty() || new_path.is_empty() {
            return Err(ContentsError::InvalidPath("cannot rename the root".to_string()));
        }
        if Self::is_within(&new_path, &path) && new_path != path {
            return Err(ContentsError::InvalidPath(format!(
                "cannot move {} into itself",
                path
            )));
        }

        let mut entries = self.write_lock()?;
        if !entries.contains_key(&path) {
            return Err(ContentsError::not_found(path));
        }
        if path == new_path {
            let entry = &entries[&path];
            return Ok(Self::model(&entries, &path, entry, false));
        }
        if entries.contains_key(&new_path) {
            return Err(ContentsError::AlreadyExists(new_path));
        }
        Self::ensure_dir(&entries, dirname(&new_path))?;

        let moved: Vec<String> = entries
            .keys()
            .filter(|key| Self::is_within(key, &path))
            .cloned()
            .collect();
        for old in moved {
            let renamed = format!("{}{}", new_path, &old[path.len()..]);
            if let Some(mut entry) = entries.remove(&old) {
                if old == path {
                    entry.last_modified = timestamp();
                }
                entries.insert(renamed.clone(), entry);
            }
            if let Some((_, checkpoints)) = self.checkpoints.remove(&old) {
                self.checkpoints.insert(renamed, checkpoints);
            }
        }

        tracing::debug!(from = %path, to = %new_path, "Renamed entry");
        let entry = &entries[&new_path];
        Ok(Self::model(&entries, &new_path, entry, false))
    }

    async fn new_untitled(&self, options: NewUntitled) -> ContentsResult<Model> {
        let dir = Self::normalize(&options.path);
        let kind = options.kind.unwrap_or(ContentType::Notebook);

        let mut entries = self.write_lock()?;
        Self::ensure_dir(&entries, &dir)?;

        let now = timestamp();
        let (path, entry) = match kind {
            ContentType::Directory => (
                Self::free_name(&entries, &dir, "Untitled Folder", "", 0),
                Entry::directory(),
            ),
            ContentType::Notebook => (
                Self::free_name(&entries, &dir, "Untitled", ".ipynb", 0),
                Entry {
                    kind,
                    content: empty_notebook(),
                    format: Some(FileFormat::Json),
                    mimetype: Some("application/x-ipynb+json".to_string()),
                    created: now.clone(),
                    last_modified: now,
                },
            ),
            ContentType::File => {
                let ext = options
                    .ext
                    .filter(|ext| !ext.is_empty())
                    .unwrap_or_else(|| ".txt".to_string());
                (
                    Self::free_name(&entries, &dir, "untitled", &ext, 0),
                    Entry {
                        kind,
                        content: Value::String(String::new()),
                        format: Some(FileFormat::Text),
                        mimetype: Some("text/plain".to_string()),
                        created: now.clone(),
                        last_modified: now,
                    },
                )
            }
        };

        tracing::debug!(path = %path, kind = %kind, "Created untitled entry");
        let model = Self::model(&entries, &path, &entry, false);
        entries.insert(path, entry);
        Ok(model)
    }

    async fn save(&self, path: &str, options: SaveOptions) -> ContentsResult<Model> {
        let path = Self::normalize(path);
        if path.is_empty() {
            return Err(ContentsError::InvalidPath("cannot save to the root".to_string()));
        }

        let mut entries = self.write_lock()?;
        Self::ensure_dir(&entries, dirname(&path))?;

        let existing = entries.get(&path).cloned();
        let kind = options
            .kind
            .or(existing.as_ref().map(|e| e.kind))
            .unwrap_or(ContentType::File);
        if let Some(existing) = &existing {
            if existing.kind.is_dir() != kind.is_dir() {
                return Err(ContentsError::AlreadyExists(path));
            }
        }

        let now = timestamp();
        let created = existing
            .as_ref()
            .map(|e| e.created.clone())
            .unwrap_or_else(|| now.clone());
        let entry = match kind {
            ContentType::Directory => Entry {
                created,
                last_modified: now,
                ..Entry::directory()
            },
            _ => {
                let format = options
                    .format
                    .or(existing.as_ref().and_then(|e| e.format))
                    .unwrap_or(match kind {
                        ContentType::Notebook => FileFormat::Json,
                        _ => FileFormat::Text,
                    });
                let content = options
                    .content
                    .or(existing.as_ref().map(|e| e.content.clone()))
                    .unwrap_or(match format {
                        FileFormat::Json => json!({}),
                        _ => Value::String(String::new()),
                    });
                let mimetype = match (kind, format) {
                    (ContentType::Notebook, _) => "application/x-ipynb+json",
                    (_, FileFormat::Json) => "application/json",
                    (_, FileFormat::Text) => "text/plain",
                    (_, FileFormat::Base64) => "application/octet-stream",
                };
                Entry {
                    kind,
                    content,
                    format: Some(format),
                    mimetype: Some(mimetype.to_string()),
                    created,
                    last_modified: now,
                }
            }
        };

        tracing::debug!(path = %path, kind = %kind, "Saved entry");
        let model = Self::model(&entries, &path, &entry, false);
        entries.insert(path, entry);
        Ok(model)
    }

    async fn copy(&self, path: &str, to_dir: &str) -> ContentsResult<Model> {
        let path = Self::normalize(path);
        let to_dir = Self::normalize(to_dir);

        let mut entries = self.write_lock()?;
        let source = entries
            .get(&path)
            .cloned()
            .ok_or_else(|| ContentsError::not_found(&path))?;
        if source.kind.is_dir() {
            return Err(ContentsError::InvalidPath(format!(
                "cannot copy directory {}",
                path
            )));
        }
        Self::ensure_dir(&entries, &to_dir)?;

        let (stem, ext) = split_ext(basename(&path));
        let target = Self::free_name(&entries, &to_dir, &format!("{}-Copy", stem), ext, 1);
        let now = timestamp();
        let entry = Entry {
            created: now.clone(),
            last_modified: now,
            ..source
        };

        tracing::debug!(from = %path, to = %target, "Copied entry");
        let model = Self::model(&entries, &target, &entry, false);
        entries.insert(target, entry);
        Ok(model)
    }

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<Checkpoint> {
        let path = Self::normalize(path);
        let entries = self.read_lock()?;
        let entry = entries
            .get(&path)
            .ok_or_else(|| ContentsError::not_found(&path))?;
        if entry.kind.is_dir() {
            return Err(ContentsError::InvalidPath(format!(
                "cannot checkpoint directory {}",
                path
            )));
        }

        let checkpoint = Checkpoint {
            id: Uuid::new_v4().to_string(),
            last_modified: timestamp(),
        };
        let mut stored = self.checkpoints.entry(path).or_default();
        stored.push(StoredCheckpoint {
            checkpoint: checkpoint.clone(),
            content: entry.content.clone(),
            format: entry.format,
        });
        let excess = stored.len().saturating_sub(self.max_checkpoints);
        stored.drain(..excess);

        Ok(checkpoint)
    }

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<Checkpoint>> {
        let path = Self::normalize(path);
        if !self.read_lock()?.contains_key(&path) {
            return Err(ContentsError::not_found(path));
        }
        Ok(self
            .checkpoints
            .get(&path)
            .map(|stored| stored.iter().map(|s| s.checkpoint.clone()).collect())
            .unwrap_or_default())
    }

    async fn restore_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        let path = Self::normalize(path);
        let snapshot = self
            .checkpoints
            .get(&path)
            .and_then(|stored| {
                stored
                    .iter()
                    .find(|s| s.checkpoint.id == checkpoint_id)
                    .cloned()
            })
            .ok_or_else(|| ContentsError::CheckpointNotFound {
                path: path.clone(),
                id: checkpoint_id.to_string(),
            })?;

        let mut entries = self.write_lock()?;
        let entry = entries
            .get_mut(&path)
            .ok_or_else(|| ContentsError::not_found(&path))?;
        entry.content = snapshot.content;
        entry.format = snapshot.format;
        entry.last_modified = timestamp();

        tracing::debug!(path = %path, checkpoint = %checkpoint_id, "Restored checkpoint");
        Ok(())
    }

    async fn delete_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        let path = Self::normalize(path);
        let missing = || ContentsError::CheckpointNotFound {
            path: path.clone(),
            id: checkpoint_id.to_string(),
        };

        let mut stored = self.checkpoints.get_mut(&path).ok_or_else(missing)?;
        let before = stored.len();
        stored.retain(|s| s.checkpoint.id != checkpoint_id);
        if stored.len() == before {
            return Err(missing());
        }
        Ok(())
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn empty_notebook() -> Value {
    json!({
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5,
        "cells": []
    })
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
