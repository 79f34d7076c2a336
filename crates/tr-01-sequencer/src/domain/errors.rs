//! Error types for the Message Sequencer

use shared_types::MessageId;
use thiserror::Error;

/// Errors surfaced by the sequencer API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// The sequencer has begun shutting down
    #[error("sequencer closed")]
    Closed,

    /// Message storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Adding the edge would close a cycle (caller configuration error)
    #[error("cycle detected: {from:?} -> {to:?}")]
    CycleDetected { from: MessageId, to: MessageId },

    /// The dependent message was already ingested
    #[error("message {0:?} already ingested")]
    AlreadyIngested(MessageId),
}

/// Errors from message storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("message not found: {0:?}")]
    NotFound(MessageId),

    #[error("storage backend failed: {0}")]
    Backend(String),
}
