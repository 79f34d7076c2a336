//! Application layer for the Message Sequencer

pub mod service;
