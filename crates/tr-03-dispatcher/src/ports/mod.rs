//! Ports layer for the Dispatcher

pub mod inbound;
pub mod outbound;
