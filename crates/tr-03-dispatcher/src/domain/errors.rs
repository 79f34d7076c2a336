//! Error types for the Dispatcher

use shared_types::{Address, DispatchError};
use thiserror::Error;
use tr_01_sequencer::{SequencerError, StorageError};

/// Result of a single signer attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The signer does not hold the key for this account; try the next one
    #[error("not authorized to sign for {0:?}")]
    NotAuthorized(Address),

    /// The signer holds the key but signing failed
    #[error("signing failed: {0}")]
    Failed(String),

    /// Key material could not be loaded
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// `35 + 2 * chain_id` does not fit the `v` field
    #[error("chain id {0} too large for replay-protected signatures")]
    UnsupportedChainId(u64),
}

impl From<SignerError> for DispatchError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::NotAuthorized(account) => DispatchError::SigningUnauthorized { account },
            other => DispatchError::Signing(other.to_string()),
        }
    }
}

/// Errors from `schedule_msg`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
