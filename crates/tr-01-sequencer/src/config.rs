//! Configuration for the Message Sequencer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sequencer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Capacity of both the ingestion buffer and the ready queue
    pub buffer: usize,
    /// Upper bound on how long `close` waits for in-flight hand-offs
    pub drain_timeout_ms: u64,
    /// Pause before re-running dependency lookups that hit a storage error
    pub retry_interval_ms: u64,
}

impl SequencerConfig {
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            buffer,
            ..Default::default()
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// Lookup retry period; never zero.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms.max(1))
    }

    /// Channel capacity; tokio channels reject zero.
    pub(crate) fn capacity(&self) -> usize {
        self.buffer.max(1)
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            buffer: 1000,
            drain_timeout_ms: 3_000,
            retry_interval_ms: 100,
        }
    }
}
