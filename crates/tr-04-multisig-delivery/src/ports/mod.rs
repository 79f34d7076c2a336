//! Ports layer for Multisig Delivery

pub mod inbound;
pub mod outbound;
