//! Adapters for the Dispatcher

mod local_signer;

pub use local_signer::{address_of, LocalKeySigner};
