//! Adapters for Multisig Delivery

mod safe_reader;

pub use safe_reader::{default_reader_factory, TransportSafeNonceReader, NONCE_SELECTOR};
