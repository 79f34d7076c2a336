//! # RocksDB Nonce Storage
//!
//! Durable nonce records, one key per account:
//!
//! ```text
//! "nonce:" ‖ address (20 bytes)  ->  next nonce (u64, big endian)
//! ```
//!
//! Writes honour `sync_writes` so an allocated number survives a crash once
//! `allocate` returned it.
//!
//! RocksDB takes an exclusive file lock on open, so one process owns the
//! store and in-process account locks are enough to serialize allocation.

use crate::config::RocksNonceConfig;
use crate::domain::errors::NonceError;
use crate::domain::locks::AccountLocks;
use crate::ports::outbound::{AccountGuard, NonceStorage};
use async_trait::async_trait;
use rocksdb::{Options, WriteOptions, DB};
use shared_types::Address;

const KEY_PREFIX: &[u8] = b"nonce:";

pub struct RocksNonceStorage {
    db: DB,
    locks: AccountLocks,
    config: RocksNonceConfig,
}

impl RocksNonceStorage {
    /// Open or create the database
    pub fn open(config: RocksNonceConfig) -> Result<Self, NonceError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| NonceError::Storage(format!("Failed to open RocksDB: {}", e)))?;

        tracing::info!(path = %config.path, "[tr-02] Nonce store opened");

        Ok(Self {
            db,
            locks: AccountLocks::new(),
            config,
        })
    }

    fn key(account: Address) -> Vec<u8> {
        let mut key = KEY_PREFIX.to_vec();
        key.extend_from_slice(account.as_bytes());
        key
    }
}

#[async_trait]
impl NonceStorage for RocksNonceStorage {
    async fn lock_account(&self, account: Address) -> Result<AccountGuard, NonceError> {
        Ok(self.locks.acquire(account).await)
    }

    async fn get_nonce(&self, account: Address) -> Result<Option<u64>, NonceError> {
        let Some(raw) = self
            .db
            .get(Self::key(account))
            .map_err(|e| NonceError::Storage(format!("RocksDB get failed: {}", e)))?
        else {
            return Ok(None);
        };
        let bytes: [u8; 8] = raw
            .as_slice()
            .try_into()
            .map_err(|_| NonceError::Corrupt(format!("{} bytes for {:?}", raw.len(), account)))?;
        Ok(Some(u64::from_be_bytes(bytes)))
    }

    async fn set_nonce(&self, account: Address, next: u64) -> Result<(), NonceError> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);

        self.db
            .put_opt(Self::key(account), next.to_be_bytes(), &write_opts)
            .map_err(|e| NonceError::Storage(format!("RocksDB put failed: {}", e)))
    }
}
