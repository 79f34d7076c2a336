//! Domain layer for the Nonce Coordinator

pub mod errors;
pub mod locks;
