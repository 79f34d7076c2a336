//! # Multisig Delivery Flows
//!
//! The deliverer reads the contract nonce from the ledger double and schedules
//! executions on a live dispatcher, so ordering comes from the real sequencer.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{next, relay, Relay};
    use shared_types::{message_id_for_sequence, Address, LedgerTransport, Message};
    use std::sync::Arc;
    use std::time::Duration;
    use tr_01_sequencer::MessageSequencer;
    use tr_03_dispatcher::{MessageScheduler, ScheduleError};
    use tr_04_multisig_delivery::{
        DeliveryConfig, DeliveryError, MultisigDeliverer, SafeTxDeliverer,
    };

    fn safe() -> Address {
        Address::from_low_u64_be(0x5afe)
    }

    fn nonce_word(n: u8) -> Vec<u8> {
        let mut word = vec![0u8; 32];
        word[31] = n;
        word
    }

    fn deliverer(relay: Relay) -> (Arc<Relay>, MultisigDeliverer) {
        let relay = Arc::new(relay);
        let transport: Arc<dyn LedgerTransport> = relay.ledger.clone();
        let scheduler: Arc<dyn MessageScheduler> = Arc::new(SchedulerHandle(relay.clone()));
        let deliverer = MultisigDeliverer::new(
            transport,
            scheduler,
            DeliveryConfig {
                relayer: relay.account,
            },
        );
        (relay, deliverer)
    }

    /// Lets the deliverer schedule on the fixture's dispatcher.
    struct SchedulerHandle(Arc<Relay>);

    #[async_trait::async_trait]
    impl MessageScheduler for SchedulerHandle {
        async fn schedule_msg(&self, msg: Message) -> Result<(), ScheduleError> {
            self.0.dispatcher.schedule_msg(msg).await
        }
    }

    fn execution(relay: &Relay, sequence: u64) -> Message {
        Message::with_id(
            message_id_for_sequence(safe(), sequence),
            relay.account,
            Some(safe()),
        )
        .with_data(vec![0x6a, 0x76, 0x12, 0x02, sequence as u8])
    }

    #[tokio::test]
    async fn test_out_of_order_executions_land_in_sequence() {
        let (relay, deliverer) = deliverer(relay().await);
        relay.ledger.set_call_result(safe(), nonce_word(3));
        let mut responses = relay.dispatcher.schedule_msg_response().unwrap();

        let mut fifth = execution(&relay, 5);
        let mut fourth = execution(&relay, 4);
        let mut third = execution(&relay, 3);
        deliverer.deliver(&mut fifth, 5).await.unwrap();
        deliverer.deliver(&mut fourth, 4).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(relay.ledger.sent().is_empty());

        deliverer.deliver(&mut third, 3).await.unwrap();

        let order: Vec<_> = [
            next(&mut responses).await,
            next(&mut responses).await,
            next(&mut responses).await,
        ]
        .iter()
        .map(|r| r.id)
        .collect();
        assert_eq!(order, vec![third.id(), fourth.id(), fifth.id()]);
        let payloads: Vec<u8> = relay.ledger.sent().iter().map(|tx| tx.tx.data[4]).collect();
        assert_eq!(payloads, vec![3, 4, 5]);
        assert_eq!(fifth.after_msg, Some(message_id_for_sequence(safe(), 4)));
    }

    #[tokio::test]
    async fn test_stale_execution_never_scheduled() {
        let (relay, deliverer) = deliverer(relay().await);
        relay.ledger.set_call_result(safe(), nonce_word(6));

        let mut stale = execution(&relay, 2);
        let err = deliverer.deliver(&mut stale, 2).await.unwrap_err();

        assert_eq!(
            err,
            DeliveryError::StaleSequence {
                on_chain: 6,
                requested: 2
            }
        );
        assert_eq!(relay.dispatcher.sequencer().queued_msg_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_sender_rejected() {
        let (relay, deliverer) = deliverer(relay().await);
        let mut req = execution(&relay, 0);
        req.from = Address::from_low_u64_be(0xbad);

        assert!(matches!(
            deliverer.deliver(&mut req, 0).await,
            Err(DeliveryError::SenderMismatch { .. })
        ));
        assert!(relay.ledger.sent().is_empty());
    }
}
