//! # Shared Types Crate
//!
//! This crate contains the entities every relay subsystem exchanges: the
//! `Message` request, its `MessageResponse`, ledger transactions and receipts,
//! and the `LedgerTransport` port through which the relay talks to the chain.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Deterministic Identifiers**: Message ids synthesized from
//!   `(contract, sequence)` come from one pure function (`ids`), so the id a
//!   dependency is looked up by is always the id it was stored under.
//! - **Transport Errors Keep Their Shape**: JSON-RPC `code`/`data` survive
//!   all the way to the response stream.

pub mod entities;
pub mod errors;
pub mod ids;
pub mod transaction;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use entities::*;
pub use errors::*;
pub use ids::{assign_message_id, keccak256, message_id_for_sequence, new_message_id};
pub use transaction::{Receipt, SignedTransaction, UnsignedTransaction};
pub use transport::LedgerTransport;
