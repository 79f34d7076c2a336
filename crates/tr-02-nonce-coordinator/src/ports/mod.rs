//! Ports layer for the Nonce Coordinator

pub mod inbound;
pub mod outbound;
