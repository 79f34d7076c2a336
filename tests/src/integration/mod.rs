//! Integration flows between relay subsystems.

pub mod flows;
pub mod multisig;
pub mod nonces;

#[cfg(test)]
pub(crate) mod fixtures {
    use shared_types::testing::MockLedger;
    use shared_types::{Address, MessageResponse};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::wrappers::ReceiverStream;
    use tokio_stream::StreamExt;
    use tr_01_sequencer::InMemoryMessageStorage;
    use tr_03_dispatcher::{Dispatcher, DispatcherConfig};

    pub const WAIT: Duration = Duration::from_secs(5);
    pub const CHAIN_ID: u64 = 1337;

    pub fn private_key(n: u8) -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = n;
        key
    }

    pub struct Relay {
        pub ledger: Arc<MockLedger>,
        pub storage: Arc<InMemoryMessageStorage>,
        pub dispatcher: Dispatcher,
        pub account: Address,
    }

    /// Dispatcher on a fresh ledger with one local key registered.
    pub async fn relay() -> Relay {
        let ledger = Arc::new(MockLedger::new(CHAIN_ID));
        let storage = Arc::new(InMemoryMessageStorage::new());
        let config = DispatcherConfig {
            msg_buffer: 32,
            drain_timeout_ms: 200,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(ledger.clone(), storage.clone(), config);
        let account = dispatcher
            .register_private_key(&private_key(7))
            .await
            .expect("valid key");
        Relay {
            ledger,
            storage,
            dispatcher,
            account,
        }
    }

    pub async fn next(stream: &mut ReceiverStream<MessageResponse>) -> MessageResponse {
        timeout(WAIT, stream.next())
            .await
            .expect("no response in time")
            .expect("stream ended")
    }
}
