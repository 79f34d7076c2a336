//! Adapters for the Message Sequencer

mod memory_storage;

pub use memory_storage::InMemoryMessageStorage;
