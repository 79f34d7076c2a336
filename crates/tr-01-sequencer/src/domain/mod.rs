//! Domain module for the Message Sequencer
//!
//! Contains the dependency graph and the error taxonomy.

pub mod errors;
pub mod graph;

pub use errors::*;
pub use graph::*;
