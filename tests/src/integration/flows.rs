//! # Scheduled Sending Flows
//!
//! Messages go through storage, the sequencer, the send pipeline and a local
//! key signer before reaching the ledger double.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{next, relay, CHAIN_ID, WAIT};
    use shared_types::{Address, DispatchError, Message, U256};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;
    use tr_01_sequencer::MessageStorage;
    use tr_03_dispatcher::{MessageScheduler, MessageSender};
    use tr_telemetry::{init_logging, TelemetryConfig};

    fn target() -> Address {
        Address::from_low_u64_be(0xc0ffee)
    }

    /// B is scheduled first but names A as its dependency
    #[tokio::test]
    async fn test_dependency_order_through_dispatcher() {
        let relay = relay().await;
        let mut responses = relay.dispatcher.schedule_msg_response().unwrap();
        let a = Message::new(relay.account, Some(target())).with_value(U256::from(1u64));
        let b = Message::new(relay.account, Some(target()))
            .with_value(U256::from(2u64))
            .after(a.id());

        relay.dispatcher.schedule_msg(b.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(relay.ledger.sent().is_empty());

        relay.dispatcher.schedule_msg(a.clone()).await.unwrap();

        let first = next(&mut responses).await;
        let second = next(&mut responses).await;
        assert_eq!((first.id, second.id), (a.id(), b.id()));
        assert!(first.is_success() && second.is_success());

        let sent = relay.ledger.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].tx.value, U256::from(1u64));
        assert_eq!(sent[1].tx.value, U256::from(2u64));
        assert!(sent[0].nonce() < sent[1].nonce());
    }

    #[tokio::test]
    async fn test_responses_recorded_in_storage() {
        let relay = relay().await;
        let mut responses = relay.dispatcher.schedule_msg_response().unwrap();
        let msg = Message::new(relay.account, Some(target()));

        relay.dispatcher.schedule_msg(msg.clone()).await.unwrap();
        let resp = next(&mut responses).await;

        let stored = relay.storage.get_msg(msg.id()).await.unwrap().unwrap();
        assert_eq!(stored.resp, Some(resp));
    }

    #[tokio::test]
    async fn test_send_then_wait_for_confirmations() {
        let relay = relay().await;
        relay.ledger.set_gas_estimate(30_000);
        let msg = Message::new(relay.account, Some(target())).with_data(vec![0xab]);

        let signed = relay.dispatcher.send_msg(&msg).await.unwrap();
        assert_eq!(signed.tx.gas, 45_000);
        assert!(signed.v == 35 + 2 * CHAIN_ID || signed.v == 36 + 2 * CHAIN_ID);

        let waiter = {
            let ledger = relay.ledger.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                ledger.advance_blocks(3);
            })
        };
        let receipt = relay
            .dispatcher
            .wait_tx_receipt(signed.hash, 3, WAIT)
            .await
            .expect("confirmed");
        waiter.await.unwrap();

        assert_eq!(receipt.tx_hash, signed.hash);
        assert!(receipt.status);
    }

    #[tokio::test]
    async fn test_unknown_account_fails_without_sending() {
        let relay = relay().await;
        let mut responses = relay.dispatcher.schedule_msg_response().unwrap();
        let stranger = Address::from_low_u64_be(0x5757);

        relay
            .dispatcher
            .schedule_msg(Message::new(stranger, Some(target())))
            .await
            .unwrap();

        assert_eq!(
            next(&mut responses).await.err,
            Some(DispatchError::SigningUnauthorized { account: stranger })
        );
        assert!(relay.ledger.sent().is_empty());
    }

    /// A message waiting on a dependency that never arrives is dropped on close
    #[tokio::test]
    async fn test_close_with_queued_messages() {
        let relay = relay().await;
        let mut responses = relay.dispatcher.schedule_msg_response().unwrap();
        let ready = Message::new(relay.account, Some(target()));
        let orphan = Message::new(relay.account, Some(target()))
            .after(Message::new(relay.account, None).id());

        relay.dispatcher.schedule_msg(orphan).await.unwrap();
        relay.dispatcher.schedule_msg(ready.clone()).await.unwrap();
        assert_eq!(next(&mut responses).await.id, ready.id());

        timeout(WAIT, relay.dispatcher.close_send_msg())
            .await
            .expect("close finished");

        assert!(timeout(WAIT, responses.next()).await.unwrap().is_none());
        assert_eq!(relay.ledger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_and_scheduled_share_nonces() {
        let relay = relay().await;
        let mut responses = relay.dispatcher.schedule_msg_response().unwrap();
        let scheduled: Vec<_> = (0..3)
            .map(|_| Message::new(relay.account, Some(target())))
            .collect();
        let batch: Vec<_> = (0..3)
            .map(|_| Message::new(relay.account, Some(target())))
            .collect();

        for msg in &scheduled {
            relay.dispatcher.schedule_msg(msg.clone()).await.unwrap();
        }
        let batched: Vec<_> = relay
            .dispatcher
            .batch_send_msg(tokio_stream::iter(batch))
            .collect()
            .await;
        for _ in 0..3 {
            assert!(next(&mut responses).await.is_success());
        }

        assert!(batched.iter().all(|r| r.is_success()));
        let mut nonces: Vec<u64> = relay.ledger.sent().iter().map(|tx| tx.nonce()).collect();
        nonces.sort_unstable();
        assert_eq!(nonces, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_logging_installs_once() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::for_subsystem("tests", "debug")
        };
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_err());
    }
}
