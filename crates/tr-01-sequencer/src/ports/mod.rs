//! Ports layer for the Message Sequencer

pub mod inbound;
pub mod outbound;
