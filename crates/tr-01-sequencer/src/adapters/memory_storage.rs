//! In-memory message storage

use crate::domain::errors::StorageError;
use crate::ports::outbound::{MessageStorage, StorageEvent};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Message, MessageId, MessageResponse};
use std::collections::HashMap;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 1024;

/// Message storage backed by a `HashMap`.
pub struct InMemoryMessageStorage {
    messages: RwLock<HashMap<MessageId, Message>>,
    events: broadcast::Sender<StorageEvent>,
}

impl InMemoryMessageStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            messages: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    fn publish(&self, event: StorageEvent) {
        // No subscriber is not an error
        let _ = self.events.send(event);
    }
}

impl Default for InMemoryMessageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStorage for InMemoryMessageStorage {
    async fn get_msg(&self, id: MessageId) -> Result<Option<Message>, StorageError> {
        Ok(self.messages.read().get(&id).cloned())
    }

    async fn add_msg(&self, msg: Message) -> Result<(), StorageError> {
        let id = msg.id();
        self.messages.write().insert(id, msg);
        self.publish(StorageEvent::Stored(id));
        Ok(())
    }

    async fn update_response(
        &self,
        id: MessageId,
        resp: MessageResponse,
    ) -> Result<(), StorageError> {
        {
            let mut messages = self.messages.write();
            let msg = messages.get_mut(&id).ok_or(StorageError::NotFound(id))?;
            msg.resp = Some(resp);
        }
        self.publish(StorageEvent::Responded(id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    #[tokio::test]
    async fn test_add_and_get() {
        let storage = InMemoryMessageStorage::new();
        let msg = Message::new(Address::from_low_u64_be(1), None);
        let id = msg.id();

        storage.add_msg(msg.clone()).await.unwrap();

        assert_eq!(storage.get_msg(id).await.unwrap(), Some(msg));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let storage = InMemoryMessageStorage::new();
        let msg = Message::new(Address::zero(), None);
        assert_eq!(storage.get_msg(msg.id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_response_publishes_event() {
        let storage = InMemoryMessageStorage::new();
        let mut events = storage.subscribe();
        let msg = Message::new(Address::zero(), None);
        let id = msg.id();

        storage.add_msg(msg).await.unwrap();
        storage
            .update_response(id, MessageResponse::failed(id, shared_types::DispatchError::Closed))
            .await
            .unwrap();

        assert_eq!(events.recv().await.unwrap(), StorageEvent::Stored(id));
        assert_eq!(events.recv().await.unwrap(), StorageEvent::Responded(id));
        let stored = storage.get_msg(id).await.unwrap().unwrap();
        assert!(stored.resp.is_some());
    }

    #[tokio::test]
    async fn test_update_response_unknown_fails() {
        let storage = InMemoryMessageStorage::new();
        let msg = Message::new(Address::zero(), None);
        let id = msg.id();

        let result = storage
            .update_response(id, MessageResponse::failed(id, shared_types::DispatchError::Closed))
            .await;

        assert_eq!(result, Err(StorageError::NotFound(id)));
    }
}
