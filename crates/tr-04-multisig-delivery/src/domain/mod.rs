//! Domain layer for Multisig Delivery

pub mod errors;
pub mod policy;
