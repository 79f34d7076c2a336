//! Configuration for the Nonce Coordinator

use crate::adapters::MemoryNonceStorage;
use crate::domain::errors::NonceError;
use crate::ports::outbound::NonceStorage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Nonce coordinator configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NonceConfig {
    pub backend: NonceBackend,
}

/// Where allocated nonces are persisted
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NonceBackend {
    #[default]
    Memory,
    RocksDb(RocksNonceConfig),
}

/// RocksDB nonce store settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocksNonceConfig {
    /// Database directory
    pub path: String,
    /// fsync every allocation (default: true)
    pub sync_writes: bool,
}

impl Default for RocksNonceConfig {
    fn default() -> Self {
        Self {
            path: "./data/nonces".to_string(),
            sync_writes: true,
        }
    }
}

impl RocksNonceConfig {
    /// Config for tests (no fsync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
        }
    }
}

impl NonceConfig {
    /// Open the configured backend.
    pub fn open_storage(&self) -> Result<Arc<dyn NonceStorage>, NonceError> {
        match &self.backend {
            NonceBackend::Memory => Ok(Arc::new(MemoryNonceStorage::new())),
            #[cfg(feature = "rocksdb")]
            NonceBackend::RocksDb(config) => Ok(Arc::new(
                crate::adapters::RocksNonceStorage::open(config.clone())?,
            )),
            #[cfg(not(feature = "rocksdb"))]
            NonceBackend::RocksDb(_) => Err(NonceError::BackendUnavailable("rocksdb")),
        }
    }
}
