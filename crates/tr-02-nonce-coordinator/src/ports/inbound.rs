//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::NonceError;
use async_trait::async_trait;
use shared_types::{Address, U256};

/// Sequence number and price source used by the dispatcher.
#[async_trait]
pub trait NonceManager: Send + Sync {
    /// Next sequence number for `account`. Never returns the same number
    /// twice for one account.
    async fn allocate(&self, account: Address) -> Result<u64, NonceError>;

    async fn suggest_price(&self) -> Result<U256, NonceError>;
}
