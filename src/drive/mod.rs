//! Drive bridge subsystem.
//!
//! Serves filesystem-style requests (readdir, getattr, get, put, ...) posted
//! by an in-browser filesystem emulation, using the content store as backing.
//!
//! # Data Flow
//! ```text
//! ClientEndpoint / DriveClient
//!     → channel.rs (JSON message queue)
//!     → protocol.rs (decode into DriveCommand; malformed → null)
//!     → bridge.rs (resolve path, call Contents, build DriveReply)
//!     → channel.rs (exactly one reply per message)
//! ```
//!
//! # Design Decisions
//! - No correlation id on the wire; callers keep one request in flight
//! - Store failures become `null` replies at the channel boundary

pub mod bridge;
pub mod channel;
pub mod protocol;

pub use bridge::{BridgeHandle, DriveBridge};
pub use channel::{channel, BridgeEndpoint, ChannelError, ClientEndpoint, DriveClient};
pub use protocol::{
    DecodeError, DriveCommand, DriveOperation, DriveReply, DriveRequest, Stat, DIR_MODE, FILE_MODE,
};
