//! # TR-03: Dispatcher Subsystem
//!
//! Turns messages into signed ledger transactions.
//!
//! ## Send pipeline
//!
//! ```text
//! Message ─► estimate gas (× multiplier) ─► gas price ─► allocate nonce
//!         ─► build tx ─► sign (signers in registration order) ─► submit
//! ```
//!
//! ## Entry points
//!
//! | Operation | Ordering | Result |
//! |-----------|----------|--------|
//! | `schedule_msg` | dependency order via TR-01 | response stream |
//! | `send_msg` / `safe_send_msg` | immediate | returned directly |
//! | `batch_send_msg` / `safe_batch_send_msg` | input order, one worker per call | response stream |
//!
//! Scheduled messages honour `start_time`, `expiration_time` and `interval`.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::LocalKeySigner;
pub use application::pipeline::Pipeline;
pub use application::service::Dispatcher;
pub use application::signers::SignerChain;
pub use config::DispatcherConfig;
pub use domain::errors::{ScheduleError, SignerError};
pub use domain::gas::apply_gas_multiplier;
pub use ports::inbound::{MessageScheduler, MessageSender};
pub use ports::outbound::TransactionSigner;
