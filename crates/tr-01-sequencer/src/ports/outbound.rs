//! Outbound Ports (Driven Ports / SPI)
//!
//! The sequencer never owns messages. It reads them from a storage it shares
//! with the dispatcher and follows the storage's change notifications.

use crate::domain::errors::StorageError;
use async_trait::async_trait;
use shared_types::{Message, MessageId, MessageResponse};
use tokio::sync::broadcast;

/// Change notification published by a [`MessageStorage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageEvent {
    /// A message was added under this id
    Stored(MessageId),
    /// A response was recorded for this id
    Responded(MessageId),
}

/// Shared message store.
///
/// Implementations must publish a [`StorageEvent`] after every successful
/// `add_msg` and `update_response`.
#[async_trait]
pub trait MessageStorage: Send + Sync {
    /// Look a message up; `Ok(None)` when the id is unknown.
    async fn get_msg(&self, id: MessageId) -> Result<Option<Message>, StorageError>;

    /// Insert or replace a message.
    async fn add_msg(&self, msg: Message) -> Result<(), StorageError>;

    /// Attach the dispatch result to a stored message.
    ///
    /// Fails with [`StorageError::NotFound`] if the message was never stored.
    async fn update_response(
        &self,
        id: MessageId,
        resp: MessageResponse,
    ) -> Result<(), StorageError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks {
    use super::*;
    use crate::adapters::InMemoryMessageStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory storage that can be told to fail its next calls.
    #[derive(Default)]
    pub struct FlakyMessageStorage {
        inner: InMemoryMessageStorage,
        lookup_failures: AtomicUsize,
        response_failures: AtomicUsize,
    }

    impl FlakyMessageStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next `count` calls to `get_msg`.
        pub fn fail_lookups(&self, count: usize) {
            self.lookup_failures.store(count, Ordering::SeqCst);
        }

        /// Fail the next `count` calls to `update_response`.
        pub fn fail_responses(&self, count: usize) {
            self.response_failures.store(count, Ordering::SeqCst);
        }

        pub fn remaining_lookup_failures(&self) -> usize {
            self.lookup_failures.load(Ordering::SeqCst)
        }

        pub fn remaining_response_failures(&self) -> usize {
            self.response_failures.load(Ordering::SeqCst)
        }

        fn trip(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl MessageStorage for FlakyMessageStorage {
        async fn get_msg(&self, id: MessageId) -> Result<Option<Message>, StorageError> {
            if Self::trip(&self.lookup_failures) {
                return Err(StorageError::Backend("connection reset".into()));
            }
            self.inner.get_msg(id).await
        }

        async fn add_msg(&self, msg: Message) -> Result<(), StorageError> {
            self.inner.add_msg(msg).await
        }

        async fn update_response(
            &self,
            id: MessageId,
            resp: MessageResponse,
        ) -> Result<(), StorageError> {
            if Self::trip(&self.response_failures) {
                return Err(StorageError::Backend("connection reset".into()));
            }
            self.inner.update_response(id, resp).await
        }

        fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
            self.inner.subscribe()
        }
    }
}
