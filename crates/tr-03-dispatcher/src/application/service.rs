//! Dispatcher Service
//!
//! Owns the sequencer, the send pipeline and the background worker that
//! connects them.
//!
//! ## Scheduled message lifecycle
//!
//! ```text
//! schedule_msg ─► storage + sequencer ─► worker pops ─┬─ expired ─► Expired response
//!                                                     ├─ deferred / recurring ─► timed task
//!                                                     └─ otherwise ─► dispatch
//! every response ─► storage.update_response ─► response stream
//! ```
//!
//! A dependent message is released only once its dependency's response is
//! in storage, so a failed `update_response` is retried
//! `response_retries` times before the worker gives up on it.
//!
//! The response stream has `msg_buffer` slots. When nobody drains it the
//! worker stalls once it is full, so callers that schedule messages should
//! take [`Dispatcher::schedule_msg_response`] and read it.

use crate::adapters::LocalKeySigner;
use crate::application::pipeline::Pipeline;
use crate::config::DispatcherConfig;
use crate::domain::errors::ScheduleError;
use crate::ports::inbound::{MessageScheduler, MessageSender};
use crate::ports::outbound::TransactionSigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    now_millis, Address, DispatchError, LedgerTransport, Message, MessageResponse, Receipt,
    SignedTransaction, TxHash,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tr_01_sequencer::{
    MemorySequencer, MessageSequencer, MessageStorage, SequencerError, StorageError,
};
use tr_02_nonce_coordinator::{NonceCoordinator, NonceManager};
use tracing::{debug, error, info, warn};

pub struct Dispatcher {
    pipeline: Arc<Pipeline>,
    storage: Arc<dyn MessageStorage>,
    sequencer: Arc<dyn MessageSequencer>,
    config: DispatcherConfig,
    msg_buffer: AtomicUsize,
    responses: Mutex<Option<mpsc::Receiver<MessageResponse>>>,
    shutdown: watch::Sender<bool>,
}

impl Dispatcher {
    /// Dispatcher with an in-memory sequencer and nonce coordinator.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        storage: Arc<dyn MessageStorage>,
        config: DispatcherConfig,
    ) -> Self {
        let sequencer = Arc::new(MemorySequencer::with_config(
            Arc::clone(&storage),
            config.sequencer_config(),
        ));
        let nonces = Arc::new(NonceCoordinator::in_memory(Arc::clone(&transport)));
        Self::with_components(transport, storage, sequencer, nonces, config)
    }

    pub fn with_components(
        transport: Arc<dyn LedgerTransport>,
        storage: Arc<dyn MessageStorage>,
        sequencer: Arc<dyn MessageSequencer>,
        nonces: Arc<dyn NonceManager>,
        config: DispatcherConfig,
    ) -> Self {
        let pipeline = Arc::new(Pipeline::new(
            transport,
            nonces,
            config.gas_multiplier_permille,
        ));
        let (response_tx, response_rx) = mpsc::channel(config.msg_buffer.max(1));
        let (shutdown, _) = watch::channel(false);

        let worker = Worker {
            pipeline: Arc::clone(&pipeline),
            storage: Arc::clone(&storage),
            responses: response_tx,
            response_retries: config.response_retries,
            response_retry_delay: config.response_retry_delay(),
        };
        tokio::spawn(worker.run(Arc::clone(&sequencer), shutdown.subscribe()));

        Self {
            pipeline,
            storage,
            sequencer,
            msg_buffer: AtomicUsize::new(config.msg_buffer),
            config,
            responses: Mutex::new(Some(response_rx)),
            shutdown,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn sequencer(&self) -> &Arc<dyn MessageSequencer> {
        &self.sequencer
    }

    /// Responses of scheduled messages, in dispatch order.
    ///
    /// The stream can be taken once; later calls return `None`. It ends
    /// after [`close_send_msg`](Self::close_send_msg) once every accepted
    /// message was answered or dropped.
    pub fn schedule_msg_response(&self) -> Option<ReceiverStream<MessageResponse>> {
        self.responses.lock().take().map(ReceiverStream::new)
    }

    /// Stop accepting scheduled messages and cancel pending timed executions.
    /// Idempotent.
    pub async fn close_send_msg(&self) {
        self.sequencer.close().await;
        self.shutdown.send_replace(true);
        info!("[tr-03] Scheduled sending closed");
    }

    /// Buffer depth for response streams created from now on.
    pub fn set_msg_buffer(&self, buffer: usize) {
        self.msg_buffer.store(buffer, Ordering::SeqCst);
    }

    pub fn msg_buffer(&self) -> usize {
        self.msg_buffer.load(Ordering::SeqCst)
    }

    /// Append a signer. Signers are tried in registration order.
    pub fn register_signer(&self, signer: Arc<dyn TransactionSigner>) {
        self.pipeline.register_signer(signer);
    }

    /// Register a raw secp256k1 private key for the ledger's chain id.
    /// Returns the account the key signs for.
    pub async fn register_private_key(&self, key: &[u8]) -> Result<Address, DispatchError> {
        let chain_id = self.pipeline.transport().chain_id().await?;
        let signer = LocalKeySigner::from_slice(key, chain_id)?;
        let address = signer.address();
        self.register_signer(Arc::new(signer));
        info!(account = ?address, chain_id, "[tr-03] Private key registered");
        Ok(address)
    }

    pub fn set_nonce_coordinator(&self, nonces: Arc<dyn NonceManager>) {
        self.pipeline.set_nonce_manager(nonces);
    }

    /// Send every message of `msgs` in order on a dedicated worker.
    pub fn batch_send_msg<S>(&self, msgs: S) -> ReceiverStream<MessageResponse>
    where
        S: Stream<Item = Message> + Send + 'static,
    {
        self.spawn_batch(msgs, false)
    }

    /// Like [`batch_send_msg`](Self::batch_send_msg), with a dry run before
    /// every send.
    pub fn safe_batch_send_msg<S>(&self, msgs: S) -> ReceiverStream<MessageResponse>
    where
        S: Stream<Item = Message> + Send + 'static,
    {
        self.spawn_batch(msgs, true)
    }

    fn spawn_batch<S>(&self, msgs: S, safe: bool) -> ReceiverStream<MessageResponse>
    where
        S: Stream<Item = Message> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.msg_buffer().max(1));
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(async move {
            let mut msgs = Box::pin(msgs);
            let mut count = 0usize;
            while let Some(msg) = msgs.next().await {
                let resp = if safe {
                    pipeline.dispatch_safe(&msg).await
                } else {
                    pipeline.dispatch(&msg).await
                };
                count += 1;
                if tx.send(resp).await.is_err() {
                    debug!("[tr-03] Batch response stream dropped, stopping");
                    break;
                }
            }
            debug!(count, safe, "[tr-03] Batch finished");
        });

        ReceiverStream::new(rx)
    }

    /// Wait until `hash` is included and buried under `confirmations` blocks.
    ///
    /// Lookup failures are retried until `timeout`; `None` means the depth
    /// was not reached in time.
    pub async fn wait_tx_receipt(
        &self,
        hash: TxHash,
        confirmations: u64,
        timeout: Duration,
    ) -> Option<Receipt> {
        let transport = self.pipeline.transport();
        let interval = self.config.receipt_poll_interval();

        let poll = async {
            loop {
                if let Ok(Some(receipt)) = transport.transaction_receipt(hash).await {
                    if let Ok(block) = transport.block_number().await {
                        if block >= receipt.block_number.saturating_add(confirmations) {
                            return receipt;
                        }
                    }
                }
                if interval.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(interval).await;
                }
            }
        };

        let receipt = tokio::time::timeout(timeout, poll).await.ok();
        if receipt.is_none() {
            debug!(tx_hash = ?hash, confirmations, "[tr-03] Receipt wait timed out");
        }
        receipt
    }
}

#[async_trait]
impl MessageScheduler for Dispatcher {
    async fn schedule_msg(&self, msg: Message) -> Result<(), ScheduleError> {
        let id = msg.id();
        self.storage.add_msg(msg.clone()).await?;
        self.sequencer.push_msg(msg).await?;
        debug!(msg_id = ?id, "[tr-03] Message scheduled");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for Dispatcher {
    async fn call_msg(&self, msg: &Message, block: Option<u64>) -> Result<Vec<u8>, DispatchError> {
        self.pipeline.call_msg(msg, block).await
    }

    async fn send_msg(&self, msg: &Message) -> Result<SignedTransaction, DispatchError> {
        self.pipeline.send_msg(msg).await
    }

    async fn safe_send_msg(
        &self,
        msg: &Message,
    ) -> Result<(SignedTransaction, Vec<u8>), DispatchError> {
        self.pipeline.safe_send_msg(msg).await
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

/// Background side of scheduled sending
#[derive(Clone)]
struct Worker {
    pipeline: Arc<Pipeline>,
    storage: Arc<dyn MessageStorage>,
    responses: mpsc::Sender<MessageResponse>,
    response_retries: u32,
    response_retry_delay: Duration,
}

impl Worker {
    async fn run(self, sequencer: Arc<dyn MessageSequencer>, shutdown: watch::Receiver<bool>) {
        loop {
            let msg = match sequencer.pop_msg().await {
                Ok(msg) => msg,
                Err(SequencerError::Closed) => break,
                Err(e) => {
                    error!(error = %e, "[tr-03] Sequencer failed, stopping worker");
                    break;
                }
            };

            let now = now_millis();
            if msg.is_expired(now) {
                self.expire(&msg).await;
            } else if msg.is_deferred(now) || msg.is_recurring() {
                tokio::spawn(self.clone().run_timed(msg, shutdown.clone()));
            } else {
                let resp = self.pipeline.dispatch(&msg).await;
                self.record(resp).await;
            }
        }
        debug!("[tr-03] Worker stopped");
    }

    /// Execute at `start_time`, then every `interval` until expiry or shutdown.
    async fn run_timed(self, msg: Message, mut shutdown: watch::Receiver<bool>) {
        let interval = u64::try_from(msg.interval.as_millis()).unwrap_or(u64::MAX);
        let mut next_at = msg.start_time.max(now_millis());
        let mut executed = false;

        loop {
            if *shutdown.borrow() {
                break;
            }
            let delay = Duration::from_millis(next_at.saturating_sub(now_millis()));
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }

            if msg.is_expired(now_millis()) {
                if !executed {
                    self.expire(&msg).await;
                }
                return;
            }

            let resp = self.pipeline.dispatch(&msg).await;
            self.record(resp).await;
            executed = true;

            if interval == 0 {
                return;
            }
            next_at = next_at.saturating_add(interval);
        }

        if !executed {
            debug!(msg_id = ?msg.id(), "[tr-03] Shut down before start time");
            self.record(MessageResponse::failed(msg.id(), DispatchError::Closed))
                .await;
        }
    }

    async fn expire(&self, msg: &Message) {
        debug!(msg_id = ?msg.id(), expiration_time = msg.expiration_time, "[tr-03] Message expired");
        let err = DispatchError::Expired {
            expiration_time: msg.expiration_time,
        };
        self.record(MessageResponse::failed(msg.id(), err)).await;
    }

    async fn record(&self, resp: MessageResponse) {
        if let Some(err) = &resp.err {
            warn!(msg_id = ?resp.id, error = %err, "[tr-03] Message failed");
        }
        self.store_response(&resp).await;
        if self.responses.send(resp).await.is_err() {
            debug!("[tr-03] Response stream dropped");
        }
    }

    async fn store_response(&self, resp: &MessageResponse) {
        let mut attempt = 0;
        loop {
            match self.storage.update_response(resp.id, resp.clone()).await {
                Ok(()) => return,
                Err(e @ StorageError::NotFound(_)) => {
                    warn!(msg_id = ?resp.id, error = %e, "[tr-03] Could not record response");
                    return;
                }
                Err(e) if attempt < self.response_retries => {
                    attempt += 1;
                    warn!(msg_id = ?resp.id, error = %e, attempt, "[tr-03] Could not record response, retrying");
                    tokio::time::sleep(self.response_retry_delay).await;
                }
                Err(e) => {
                    error!(
                        msg_id = ?resp.id,
                        error = %e,
                        attempts = attempt + 1,
                        "[tr-03] Response not recorded, dependents stay blocked"
                    );
                    return;
                }
            }
        }
    }
}
