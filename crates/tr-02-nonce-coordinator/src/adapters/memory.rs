//! In-memory nonce storage

use crate::domain::errors::NonceError;
use crate::domain::locks::AccountLocks;
use crate::ports::outbound::{AccountGuard, NonceStorage};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashMap;

/// Single-process nonce storage. Lost on restart; the ledger's pending
/// nonce re-seeds it.
#[derive(Default)]
pub struct MemoryNonceStorage {
    locks: AccountLocks,
    nonces: RwLock<HashMap<Address, u64>>,
}

impl MemoryNonceStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NonceStorage for MemoryNonceStorage {
    async fn lock_account(&self, account: Address) -> Result<AccountGuard, NonceError> {
        Ok(self.locks.acquire(account).await)
    }

    async fn get_nonce(&self, account: Address) -> Result<Option<u64>, NonceError> {
        Ok(self.nonces.read().get(&account).copied())
    }

    async fn set_nonce(&self, account: Address, next: u64) -> Result<(), NonceError> {
        self.nonces.write().insert(account, next);
        Ok(())
    }
}
