//! Error types for the client core.

use thiserror::Error;

/// Errors raised by edit capture, reconciliation and session setup.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    /// The editing surface did not expose its initial document.
    #[error("editing surface has no initial document attribute `{attribute}`")]
    MissingInitialDocument { attribute: String },

    /// An input event reported a caret outside of its own value.
    #[error("cursor offset {offset} is outside the edited value (length {len})")]
    CursorOutOfRange { offset: usize, len: usize },

    /// The channel refused the operation.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A payload from the channel could not be decoded.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure reported by a channel implementation when sending.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelError {
    /// The connection is gone.
    #[error("channel closed")]
    Closed,

    /// The transport rejected the message.
    #[error("send failed: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
