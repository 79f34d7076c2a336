//! # TR-02: Nonce Coordinator Subsystem
//!
//! Hands out transaction sequence numbers per account.
//!
//! ## Guarantees
//!
//! - Allocations for one account are serialized; different accounts never
//!   wait on each other.
//! - Numbers are strictly increasing per account and never reissued once
//!   persisted, including across restarts when a durable backend is used.
//! - Transactions sent outside the relay are picked up: every allocation
//!   starts from `max(stored next, ledger pending nonce)`.
//!
//! ## Backends
//!
//! | Backend | Scope |
//! |---------|-------|
//! | `MemoryNonceStorage` | single process |
//! | `RocksNonceStorage` (feature `rocksdb`) | durable, shared by instances using one database |

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::MemoryNonceStorage;
#[cfg(feature = "rocksdb")]
pub use adapters::RocksNonceStorage;
pub use application::service::NonceCoordinator;
pub use config::{NonceBackend, NonceConfig, RocksNonceConfig};
pub use domain::errors::NonceError;
pub use domain::locks::AccountLocks;
pub use ports::inbound::NonceManager;
pub use ports::outbound::{AccountGuard, NonceStorage};
