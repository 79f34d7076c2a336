//! Per-account mutual exclusion

use crate::ports::outbound::AccountGuard;
use parking_lot::Mutex;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of one async lock per account.
///
/// Locks are created on first use and live as long as the registry.
#[derive(Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: Address) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.locks.lock().entry(account).or_default())
    }

    /// Wait for the account's lock and hold it until the guard drops.
    pub async fn acquire(&self, account: Address) -> AccountGuard {
        Box::new(self.get(account).lock_owned().await)
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
