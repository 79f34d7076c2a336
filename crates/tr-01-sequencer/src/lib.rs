//! # TR-01: Message Sequencer Subsystem
//!
//! Orders messages by their declared dependencies and hands ready messages to
//! the dispatcher through a bounded queue.
//!
//! ## Architecture
//!
//! - **Domain**: `DependencyGraph` (incremental Kahn frontier), errors
//! - **Ports**: Inbound (`MessageSequencer`) and Outbound (`MessageStorage`)
//! - **Adapters**: `InMemoryMessageStorage`
//! - **Application**: `MemorySequencer` with its ingestion and emission loops
//!
//! ## Flow
//!
//! ```text
//! push ─► ingestion ─► DependencyGraph ─► emission ─► ready queue ─► pop
//!             ▲                ▲
//!             └── storage events (Stored / Responded)
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryMessageStorage;
pub use application::service::MemorySequencer;
pub use config::SequencerConfig;
pub use domain::errors::{GraphError, SequencerError, StorageError};
pub use domain::graph::{DependencyGraph, VertexState};
pub use ports::inbound::MessageSequencer;
pub use ports::outbound::{MessageStorage, StorageEvent};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::outbound::mocks;
