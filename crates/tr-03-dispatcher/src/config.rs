//! Configuration for the Dispatcher

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tr_01_sequencer::SequencerConfig;

/// Dispatcher configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Depth of the sequencer queues and of every response stream
    pub msg_buffer: usize,
    /// Safety factor applied to gas estimates, in thousandths (1500 = 1.5×)
    pub gas_multiplier_permille: u64,
    /// Pause between receipt polls; zero polls back to back
    pub receipt_poll_interval_ms: u64,
    /// How long closing waits for in-flight sequencer hand-offs
    pub drain_timeout_ms: u64,
    /// Extra attempts at recording a response after a storage error
    pub response_retries: u32,
    /// Pause between those attempts
    pub response_retry_delay_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            msg_buffer: 1000,
            gas_multiplier_permille: 1500,
            receipt_poll_interval_ms: 0,
            drain_timeout_ms: 3_000,
            response_retries: 5,
            response_retry_delay_ms: 100,
        }
    }
}

impl DispatcherConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn response_retry_delay(&self) -> Duration {
        Duration::from_millis(self.response_retry_delay_ms)
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            buffer: self.msg_buffer,
            drain_timeout_ms: self.drain_timeout_ms,
            ..Default::default()
        }
    }
}
