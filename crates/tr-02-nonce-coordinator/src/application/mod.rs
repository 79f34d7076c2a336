//! Application layer for the Nonce Coordinator

pub mod service;
