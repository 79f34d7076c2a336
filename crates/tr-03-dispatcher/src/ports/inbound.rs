//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::ScheduleError;
use async_trait::async_trait;
use shared_types::{DispatchError, Message, SignedTransaction};

/// Dependency-ordered submission.
#[async_trait]
pub trait MessageScheduler: Send + Sync {
    /// Store the message and queue it for dispatch once its `after_msg`
    /// dependency was responded.
    async fn schedule_msg(&self, msg: Message) -> Result<(), ScheduleError>;
}

/// Immediate submission, bypassing the sequencer.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Read-only execution at `block`, or the latest block.
    async fn call_msg(&self, msg: &Message, block: Option<u64>) -> Result<Vec<u8>, DispatchError>;

    async fn send_msg(&self, msg: &Message) -> Result<SignedTransaction, DispatchError>;

    /// Dry run first, then send. Returns the submitted transaction and the
    /// dry-run output; a failing dry run sends nothing.
    async fn safe_send_msg(
        &self,
        msg: &Message,
    ) -> Result<(SignedTransaction, Vec<u8>), DispatchError>;
}
