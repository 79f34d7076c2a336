//! # Nonce Coordination Flows
//!
//! Several dispatchers sharing one coordinator, and allocations surviving a
//! restart on the durable backend.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{private_key, CHAIN_ID};
    use shared_types::testing::MockLedger;
    use shared_types::{Address, Message, MessageResponse};
    use std::sync::Arc;
    use tokio_stream::StreamExt;
    use tr_01_sequencer::InMemoryMessageStorage;
    use tr_02_nonce_coordinator::{NonceCoordinator, NonceManager};
    use tr_03_dispatcher::{Dispatcher, DispatcherConfig, MessageSender};

    async fn dispatcher(
        ledger: &Arc<MockLedger>,
        nonces: Arc<dyn NonceManager>,
    ) -> (Dispatcher, Address) {
        let dispatcher = Dispatcher::new(
            ledger.clone(),
            Arc::new(InMemoryMessageStorage::new()),
            DispatcherConfig::default(),
        );
        dispatcher.set_nonce_coordinator(nonces);
        let account = dispatcher
            .register_private_key(&private_key(9))
            .await
            .unwrap();
        (dispatcher, account)
    }

    #[tokio::test]
    async fn test_two_dispatchers_share_one_coordinator() {
        let ledger = Arc::new(MockLedger::new(CHAIN_ID));
        let nonces: Arc<dyn NonceManager> = Arc::new(NonceCoordinator::in_memory(ledger.clone()));
        let (left, account) = dispatcher(&ledger, nonces.clone()).await;
        let (right, _) = dispatcher(&ledger, nonces).await;
        ledger.set_pending_nonce(account, 10);

        let batch = |n: usize| -> Vec<Message> {
            (0..n)
                .map(|_| Message::new(account, Some(Address::from_low_u64_be(0xd0))))
                .collect()
        };
        let left_stream = left.batch_send_msg(tokio_stream::iter(batch(8)));
        let right_stream = right.batch_send_msg(tokio_stream::iter(batch(8)));
        let (l, r): (Vec<MessageResponse>, Vec<MessageResponse>) =
            tokio::join!(left_stream.collect(), right_stream.collect());

        assert!(l.iter().chain(r.iter()).all(MessageResponse::is_success));
        let mut used: Vec<u64> = ledger.sent().iter().map(|tx| tx.nonce()).collect();
        used.sort_unstable();
        assert_eq!(used, (10..26).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_ledger_ahead_of_coordinator() {
        let ledger = Arc::new(MockLedger::new(CHAIN_ID));
        let nonces: Arc<dyn NonceManager> = Arc::new(NonceCoordinator::in_memory(ledger.clone()));
        let (relay, account) = dispatcher(&ledger, nonces).await;
        let msg = Message::new(account, Some(Address::from_low_u64_be(0xd0)));

        assert_eq!(relay.send_msg(&msg).await.unwrap().nonce(), 0);
        // Sent elsewhere with the same key
        ledger.set_pending_nonce(account, 5);
        assert_eq!(relay.send_msg(&msg).await.unwrap().nonce(), 5);
    }

    #[cfg(feature = "rocksdb")]
    #[tokio::test]
    async fn test_durable_allocations_survive_restart() {
        use tr_02_nonce_coordinator::{NonceBackend, NonceConfig, RocksNonceConfig};

        let dir = tempfile::tempdir().unwrap();
        let config = NonceConfig {
            backend: NonceBackend::RocksDb(RocksNonceConfig::for_testing(
                dir.path().to_string_lossy(),
            )),
        };
        let ledger = Arc::new(MockLedger::new(CHAIN_ID));
        let account = Address::from_low_u64_be(0xace);

        {
            let coordinator = NonceCoordinator::new(ledger.clone(), config.open_storage().unwrap());
            for expected in 0..3 {
                assert_eq!(coordinator.allocate(account).await.unwrap(), expected);
            }
        }

        let coordinator = NonceCoordinator::new(ledger, config.open_storage().unwrap());
        assert_eq!(coordinator.allocate(account).await.unwrap(), 3);
    }
}
