//! Application layer for the Dispatcher

pub mod pipeline;
pub mod service;
pub mod signers;
