//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::SequencerError;
use async_trait::async_trait;
use shared_types::Message;

/// Dependency-ordered message queue.
///
/// A message with `after_msg = X` is never returned by `pop_msg` before the
/// message stored under `X` carries a response.
#[async_trait]
pub trait MessageSequencer: Send + Sync {
    /// Enqueue a message. Waits while the ingestion buffer is full.
    async fn push_msg(&self, msg: Message) -> Result<(), SequencerError>;

    /// Wait for the next ready message.
    ///
    /// Returns [`SequencerError::Closed`] once the sequencer was closed and
    /// every message already handed to the ready queue was taken.
    async fn pop_msg(&self) -> Result<Message, SequencerError>;

    /// Oldest message that is ready but not yet handed to the ready queue.
    ///
    /// Best-effort: never blocks and never changes what `pop_msg` returns.
    /// Messages already sitting in the ready queue are not visible.
    fn peek_msg(&self) -> Option<Message>;

    /// Messages pushed but not yet ingested into the graph
    fn queued_msg_count(&self) -> usize;

    /// Messages handed to the ready queue but not yet popped
    fn pending_msg_count(&self) -> usize;

    /// Stop accepting messages and shut the background loops down.
    /// Idempotent.
    async fn close(&self);
}
