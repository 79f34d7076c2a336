//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::NonceError;
use async_trait::async_trait;
use shared_types::Address;
use std::any::Any;

/// Proof of exclusive access to one account. Dropping it releases the lock.
pub type AccountGuard = Box<dyn Any + Send + Sync>;

/// Persistence of the next free nonce per account.
///
/// Allocations hold the guard from `lock_account` across `get_nonce` and
/// `set_nonce`. A backend shared by several processes must return a guard
/// that excludes those processes too, such as a lease in the shared store.
#[async_trait]
pub trait NonceStorage: Send + Sync {
    /// Wait for exclusive access to `account`.
    async fn lock_account(&self, account: Address) -> Result<AccountGuard, NonceError>;

    /// Next free nonce, `None` if the account was never seen.
    async fn get_nonce(&self, account: Address) -> Result<Option<u64>, NonceError>;

    async fn set_nonce(&self, account: Address, next: u64) -> Result<(), NonceError>;
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::domain::locks::AccountLocks;

    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Storage whose reads and writes always fail
    #[derive(Default)]
    pub struct BrokenNonceStorage {
        locks: AccountLocks,
    }

    #[async_trait]
    impl NonceStorage for BrokenNonceStorage {
        async fn lock_account(&self, account: Address) -> Result<AccountGuard, NonceError> {
            Ok(self.locks.acquire(account).await)
        }

        async fn get_nonce(&self, _account: Address) -> Result<Option<u64>, NonceError> {
            Err(NonceError::Storage("unreachable".into()))
        }

        async fn set_nonce(&self, _account: Address, _next: u64) -> Result<(), NonceError> {
            Err(NonceError::Storage("unreachable".into()))
        }
    }

    /// Storage shared by several coordinators. Every call yields first, like
    /// a networked store would, and leases can be switched off.
    #[derive(Default)]
    pub struct LeasedNonceStorage {
        locks: AccountLocks,
        nonces: Mutex<HashMap<Address, u64>>,
        leases: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl LeasedNonceStorage {
        pub fn leases(&self) -> usize {
            self.leases.load(Ordering::SeqCst)
        }

        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl NonceStorage for LeasedNonceStorage {
        async fn lock_account(&self, account: Address) -> Result<AccountGuard, NonceError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(NonceError::Storage("lease service unavailable".into()));
            }
            tokio::task::yield_now().await;
            let guard = self.locks.acquire(account).await;
            self.leases.fetch_add(1, Ordering::SeqCst);
            Ok(guard)
        }

        async fn get_nonce(&self, account: Address) -> Result<Option<u64>, NonceError> {
            tokio::task::yield_now().await;
            Ok(self.nonces.lock().get(&account).copied())
        }

        async fn set_nonce(&self, account: Address, next: u64) -> Result<(), NonceError> {
            tokio::task::yield_now().await;
            self.nonces.lock().insert(account, next);
            Ok(())
        }
    }
}
