//! Application layer for Multisig Delivery

pub mod service;
