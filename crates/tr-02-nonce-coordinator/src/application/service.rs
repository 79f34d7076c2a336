//! Nonce Coordinator Service

use crate::adapters::MemoryNonceStorage;
use crate::domain::errors::NonceError;
use crate::ports::inbound::NonceManager;
use crate::ports::outbound::NonceStorage;
use async_trait::async_trait;
use shared_types::{Address, LedgerTransport, U256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Allocates nonces from a [`NonceStorage`], reconciled against the ledger.
pub struct NonceCoordinator {
    transport: Arc<dyn LedgerTransport>,
    storage: Arc<dyn NonceStorage>,
}

impl NonceCoordinator {
    pub fn new(transport: Arc<dyn LedgerTransport>, storage: Arc<dyn NonceStorage>) -> Self {
        Self { transport, storage }
    }

    /// Coordinator backed by process-local storage.
    pub fn in_memory(transport: Arc<dyn LedgerTransport>) -> Self {
        Self::new(transport, Arc::new(MemoryNonceStorage::new()))
    }
}

#[async_trait]
impl NonceManager for NonceCoordinator {
    async fn allocate(&self, account: Address) -> Result<u64, NonceError> {
        let _guard = self.storage.lock_account(account).await?;

        let stored = self.storage.get_nonce(account).await?;
        let next = match (self.transport.pending_nonce_at(account).await, stored) {
            (Ok(pending), Some(stored)) => pending.max(stored),
            (Ok(pending), None) => pending,
            (Err(e), Some(stored)) => {
                warn!(account = ?account, error = %e, "[tr-02] Pending nonce unavailable, using stored value");
                stored
            }
            (Err(e), None) => return Err(e.into()),
        };

        let following = next.checked_add(1).ok_or(NonceError::Overflow)?;
        self.storage.set_nonce(account, following).await?;

        debug!(account = ?account, nonce = next, "[tr-02] Nonce allocated");
        Ok(next)
    }

    async fn suggest_price(&self) -> Result<U256, NonceError> {
        Ok(self.transport.suggest_gas_price().await?)
    }
}
