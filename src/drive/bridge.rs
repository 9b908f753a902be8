//! Drive bridge responder.
//!
//! # Responsibilities
//! - Resolve message paths against the mount prefix
//! - Perform each decoded operation against the content store
//! - Post exactly one reply per inbound message
//!
//! # Design Decisions
//! - One message is served at a time; there is no state across messages
//! - `handle` propagates store failures (except `lookup`, which reports them
//!   as `{ok: false}`); the serve loop turns any failure into `null`
//! - `mknod` is two store calls; a failed rename removes the created entry

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::drive::channel::BridgeEndpoint;
use crate::drive::protocol::{
    DriveCommand, DriveOperation, DriveReply, Stat, DIR_MODE, FILE_MODE,
};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::{self, DriveOutcome};
use crate::services::contents::{
    basename, dirname, split_ext, ContentType, ContentsResult, FetchOptions, FileFormat, Model,
    NewUntitled, SaveOptions,
};
use crate::services::Contents;

/// Serves drive operations for one content store.
pub struct DriveBridge {
    contents: Arc<dyn Contents>,
    mount_prefix: String,
}

impl std::fmt::Debug for DriveBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveBridge")
            .field("mount_prefix", &self.mount_prefix)
            .finish()
    }
}

impl DriveBridge {
    pub fn new(contents: Arc<dyn Contents>, mount_prefix: impl Into<String>) -> Self {
        let mount_prefix = mount_prefix.into();
        Self {
            mount_prefix: mount_prefix.trim_end_matches('/').to_string(),
            contents,
        }
    }

    /// Store path for a message path: the mount prefix and any leading `/` removed.
    pub fn resolve<'a>(&self, path: &'a str) -> &'a str {
        let rest = match path.strip_prefix(self.mount_prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        };
        rest.trim_start_matches('/')
    }

    /// Decode and perform one raw message.
    ///
    /// A message that fails to decode yields `Ok(DriveReply::Null)` without
    /// touching the store.
    pub async fn handle(&self, message: Value) -> ContentsResult<DriveReply> {
        match DriveCommand::decode(message) {
            Ok(command) => self.execute(command).await,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed drive message");
                metrics::record_drive_op("malformed", DriveOutcome::Malformed);
                Ok(DriveReply::Null)
            }
        }
    }

    /// Perform one decoded operation.
    pub async fn execute(&self, command: DriveCommand) -> ContentsResult<DriveReply> {
        let op = command.operation.name();
        let path = self.resolve(&command.path).to_string();
        tracing::debug!(op, path = %path, "Drive operation");

        let result = self.perform(&path, command.operation).await;
        let outcome = if result.is_ok() {
            DriveOutcome::Ok
        } else {
            DriveOutcome::Error
        };
        metrics::record_drive_op(op, outcome);
        result
    }

    async fn perform(&self, path: &str, operation: DriveOperation) -> ContentsResult<DriveReply> {
        match operation {
            DriveOperation::Readdir => {
                let model = self.contents.get(path, FetchOptions::with_content()).await?;
                Ok(DriveReply::Names(model.child_names().unwrap_or_default()))
            }
            DriveOperation::Rmdir => {
                self.contents.delete(path).await?;
                Ok(DriveReply::Null)
            }
            DriveOperation::Rename { new_path } => {
                let new_path = self.resolve(&new_path);
                self.contents.rename(path, new_path).await?;
                Ok(DriveReply::Null)
            }
            DriveOperation::Getmode => {
                let model = self.contents.get(path, FetchOptions::default()).await?;
                Ok(DriveReply::Mode(mode_of(&model)))
            }
            DriveOperation::Lookup => match self.contents.get(path, FetchOptions::default()).await {
                Ok(model) => Ok(DriveReply::Lookup {
                    ok: true,
                    mode: Some(mode_of(&model)),
                }),
                Err(e) => {
                    tracing::debug!(path = %path, error = %e, "Lookup missed");
                    Ok(DriveReply::Lookup { ok: false, mode: None })
                }
            },
            DriveOperation::Mknod { mode } => {
                self.mknod(path, mode).await?;
                Ok(DriveReply::Null)
            }
            DriveOperation::Getattr => {
                let model = self.contents.get(path, FetchOptions::default()).await?;
                Ok(DriveReply::Stat(stat_of(&model)))
            }
            DriveOperation::Get => {
                let model = self.contents.get(path, FetchOptions::with_content()).await?;
                if model.is_dir() {
                    return Ok(DriveReply::Null);
                }
                let content = match model.format {
                    Some(FileFormat::Json) => Value::String(model.content.to_string()),
                    _ => model.content,
                };
                Ok(DriveReply::File {
                    content,
                    format: model.format,
                })
            }
            DriveOperation::Put { format, content } => {
                let content = match format {
                    FileFormat::Json => {
                        serde_json::from_str(&content).unwrap_or(Value::String(content))
                    }
                    _ => Value::String(content),
                };
                self.contents
                    .save(
                        path,
                        SaveOptions {
                            content: Some(content),
                            kind: Some(ContentType::File),
                            format: Some(format),
                        },
                    )
                    .await?;
                Ok(DriveReply::Null)
            }
        }
    }

    async fn mknod(&self, path: &str, mode: u32) -> ContentsResult<()> {
        let kind = if mode == DIR_MODE {
            ContentType::Directory
        } else {
            ContentType::File
        };
        let (_, ext) = split_ext(basename(path));

        let created = self
            .contents
            .new_untitled(NewUntitled {
                path: dirname(path).to_string(),
                kind: Some(kind),
                ext: Some(ext.to_string()).filter(|ext| !ext.is_empty()),
            })
            .await?;

        if let Err(e) = self.contents.rename(&created.path, path).await {
            if let Err(cleanup) = self.contents.delete(&created.path).await {
                tracing::warn!(
                    path = %created.path,
                    error = %cleanup,
                    "Failed to remove entry after mknod rename failure"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Spawn the serve loop on `endpoint`.
    pub fn start(self: Arc<Self>, endpoint: BridgeEndpoint) -> BridgeHandle {
        let shutdown = Shutdown::new();
        let stop = shutdown.subscribe();
        let task = tokio::spawn(self.serve(endpoint, stop));
        BridgeHandle { shutdown, task }
    }

    async fn serve(
        self: Arc<Self>,
        mut endpoint: BridgeEndpoint,
        mut stop: tokio::sync::broadcast::Receiver<()>,
    ) {
        tracing::info!(mount_prefix = %self.mount_prefix, "Drive bridge started");
        loop {
            let message = tokio::select! {
                _ = stop.recv() => break,
                message = endpoint.next_message() => message,
            };
            let Some(message) = message else {
                break;
            };

            let reply = match self.handle(message).await {
                Ok(reply) => reply.into_value(),
                Err(e) => {
                    tracing::error!(error = %e, "Drive operation failed");
                    Value::Null
                }
            };
            if endpoint.post_message(reply).await.is_err() {
                tracing::debug!("Drive client gone");
                break;
            }
        }
        tracing::info!("Drive bridge stopped");
    }
}

/// Handle to a running bridge.
#[derive(Debug)]
pub struct BridgeHandle {
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl BridgeHandle {
    /// Stop after the message in progress (if any) has been answered.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Drive bridge task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

fn mode_of(model: &Model) -> u32 {
    if model.is_dir() {
        DIR_MODE
    } else {
        FILE_MODE
    }
}

fn stat_of(model: &Model) -> Stat {
    Stat {
        dev: 0,
        ino: 0,
        mode: mode_of(model),
        nlink: 0,
        uid: 0,
        gid: 0,
        rdev: 0,
        size: model.size,
        blksize: 0,
        blocks: 0,
        atime: model.last_modified.clone(),
        mtime: model.last_modified.clone(),
        ctime: model.last_modified.clone(),
        timestamp: 0,
    }
}
