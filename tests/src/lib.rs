//! # Tx-Relay Test Suite
//!
//! Cross-subsystem flows against the in-memory ledger double.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # sequencer → dispatcher → ledger
//!     ├── multisig.rs   # multisig deliverer on a live dispatcher
//!     └── nonces.rs     # shared coordinators and durable storage
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tr-tests
//! cargo test -p tr-tests --features rocksdb
//! ```

pub mod integration;
