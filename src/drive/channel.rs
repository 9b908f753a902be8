//! Bidirectional message channel between the bridge and its caller.
//!
//! # Design Decisions
//! - Messages are plain JSON values; decoding happens in the bridge
//! - Replies carry no correlation id, so `DriveClient` keeps exactly one
//!   request in flight by holding a lock across send and receive

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::drive::protocol::DriveRequest;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("drive channel closed")]
    Closed,

    #[error("failed to encode drive request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Create a connected pair of endpoints with the given buffer size per direction.
pub fn channel(capacity: usize) -> (BridgeEndpoint, ClientEndpoint) {
    let capacity = capacity.max(1);
    let (request_tx, request_rx) = mpsc::channel(capacity);
    let (reply_tx, reply_rx) = mpsc::channel(capacity);
    (
        BridgeEndpoint {
            inbound: request_rx,
            outbound: reply_tx,
        },
        ClientEndpoint {
            outbound: request_tx,
            inbound: reply_rx,
        },
    )
}

/// Bridge side: receives requests, posts replies.
#[derive(Debug)]
pub struct BridgeEndpoint {
    inbound: mpsc::Receiver<Value>,
    outbound: mpsc::Sender<Value>,
}

impl BridgeEndpoint {
    /// Next inbound message, or `None` once every client is gone.
    pub async fn next_message(&mut self) -> Option<Value> {
        self.inbound.recv().await
    }

    pub async fn post_message(&self, message: Value) -> Result<(), ChannelError> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

/// Caller side: posts requests, receives replies.
#[derive(Debug)]
pub struct ClientEndpoint {
    outbound: mpsc::Sender<Value>,
    inbound: mpsc::Receiver<Value>,
}

impl ClientEndpoint {
    pub async fn post_message(&self, message: Value) -> Result<(), ChannelError> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| ChannelError::Closed)
    }

    pub async fn next_message(&mut self) -> Option<Value> {
        self.inbound.recv().await
    }
}

/// Request/reply client over a `ClientEndpoint`.
///
/// Safe to share between tasks; concurrent calls are serialized. A request
/// dropped after posting (timeout, `select!`) leaves its reply owed; the next
/// request discards owed replies before posting its own.
#[derive(Debug)]
pub struct DriveClient {
    state: Mutex<ClientState>,
}

#[derive(Debug)]
struct ClientState {
    endpoint: ClientEndpoint,
    /// Replies posted by the bridge for requests whose callers went away.
    owed: usize,
}

impl DriveClient {
    pub fn new(endpoint: ClientEndpoint) -> Self {
        Self {
            state: Mutex::new(ClientState { endpoint, owed: 0 }),
        }
    }

    /// Post a raw message and wait for its reply.
    ///
    /// Cancel safe: dropping the future never shifts later replies.
    pub async fn request_raw(&self, message: Value) -> Result<Value, ChannelError> {
        let mut state = self.state.lock().await;

        while state.owed > 0 {
            let stale = state
                .endpoint
                .next_message()
                .await
                .ok_or(ChannelError::Closed)?;
            state.owed -= 1;
            tracing::debug!(reply = %stale, "Discarded reply of a cancelled drive request");
        }

        state.endpoint.post_message(message).await?;
        state.owed += 1;

        let reply = state
            .endpoint
            .next_message()
            .await
            .ok_or(ChannelError::Closed)?;
        state.owed -= 1;
        Ok(reply)
    }

    /// Post a drive request and wait for its reply.
    pub async fn request(&self, request: &DriveRequest) -> Result<Value, ChannelError> {
        let message = serde_json::to_value(request)?;
        self.request_raw(message).await
    }
}
