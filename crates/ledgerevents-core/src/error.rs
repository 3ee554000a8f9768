//! Error taxonomy shared across the event-delivery layer.

use thiserror::Error;

pub use crate::position::InvalidPosition;

/// Failures raised by the event stream itself.
///
/// These are forwarded verbatim to the application's delivery handler and
/// never touch the checkpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The stream to the peer failed (connect, send, receive).
    #[error("event stream error: {0}")]
    Stream(String),

    /// The peer closed the event stream.
    #[error("peer disconnected: {peer}")]
    Disconnected { peer: String },

    /// The event service was asked for a registration after shutdown.
    #[error("event service closed")]
    Closed,
}

/// A raw notification carrying neither a block position nor any
/// recognizable block data. Surfaced to the caller of the delivery path,
/// never forwarded to the application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification carries neither a block number nor recognizable block data")]
pub struct MalformedEvent;

/// Failures from a checkpoint store's `check`/`save` contract.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The key is not a decimal block position.
    #[error(transparent)]
    InvalidKey(#[from] InvalidPosition),

    /// Reading or writing the backing storage failed.
    #[error("checkpoint storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing storage holds data that does not parse.
    #[error("corrupt checkpoint data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
