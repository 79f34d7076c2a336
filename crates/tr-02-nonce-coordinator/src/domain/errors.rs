//! Error types for the Nonce Coordinator

use shared_types::{DispatchError, TransportError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NonceError {
    /// The ledger could not report the pending nonce and nothing was stored
    #[error(transparent)]
    Ledger(#[from] TransportError),

    /// Storage backend failure
    #[error("nonce storage failed: {0}")]
    Storage(String),

    /// Stored value could not be decoded
    #[error("corrupt nonce record: {0}")]
    Corrupt(String),

    /// Backend selected in configuration is not compiled in
    #[error("nonce backend unavailable: {0}")]
    BackendUnavailable(&'static str),

    /// Sequence space for the account is exhausted
    #[error("nonce overflow")]
    Overflow,
}

impl From<NonceError> for DispatchError {
    fn from(err: NonceError) -> Self {
        match err {
            NonceError::Ledger(e) => DispatchError::Transport(e),
            other => DispatchError::Nonce(other.to_string()),
        }
    }
}
