//! # TR-04: Multisig Delivery Subsystem
//!
//! Schedules executions of a multisig contract so that they reach the ledger
//! in the contract's own nonce order.
//!
//! ## Placement policy
//!
//! | On-chain nonce vs. requested | Action |
//! |------------------------------|--------|
//! | equal | schedule now |
//! | lower | schedule after the message for `requested - 1` |
//! | higher | reject as stale |
//!
//! The message for sequence `n` on contract `c` is identified by
//! [`message_id_for_sequence(c, n)`](shared_types::message_id_for_sequence);
//! callers must store multisig messages under that id for the chain of
//! dependencies to resolve.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{default_reader_factory, TransportSafeNonceReader, NONCE_SELECTOR};
pub use application::service::MultisigDeliverer;
pub use config::DeliveryConfig;
pub use domain::errors::DeliveryError;
pub use domain::policy::{place, Placement};
pub use ports::inbound::SafeTxDeliverer;
pub use ports::outbound::{SafeNonceReader, SafeReaderFactory};
