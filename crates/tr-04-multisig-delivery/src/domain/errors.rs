//! Error types for Multisig Delivery

use shared_types::{Address, TransportError};
use thiserror::Error;
use tr_03_dispatcher::ScheduleError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryError {
    /// Request not sent by the configured relayer
    #[error("from address {actual:?} does not match relayer {expected:?}")]
    SenderMismatch { expected: Address, actual: Address },

    /// Request has no destination contract
    #[error("request has no destination contract")]
    MissingDestination,

    /// Requested sequence was already executed on chain
    #[error("sequence {requested} is stale, contract is at {on_chain}")]
    StaleSequence { on_chain: u64, requested: u64 },

    /// Reading the contract nonce failed
    #[error("nonce read failed: {0}")]
    Reader(#[from] TransportError),

    /// Reader output could not be decoded
    #[error("malformed nonce output: {0}")]
    MalformedOutput(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl DeliveryError {
    /// Rejected before anything was read or scheduled
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SenderMismatch { .. } | Self::MissingDestination | Self::StaleSequence { .. }
        )
    }
}
