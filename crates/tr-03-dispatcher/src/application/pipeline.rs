//! Send pipeline
//!
//! Everything between a [`Message`] and a submitted transaction. Used directly
//! by the immediate send operations and by the scheduled worker.

use crate::application::signers::SignerChain;
use crate::domain::gas::apply_gas_multiplier;
use crate::ports::inbound::MessageSender;
use crate::ports::outbound::TransactionSigner;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    Address, CallRequest, DispatchError, LedgerTransport, Message, MessageResponse,
    SignedTransaction, UnsignedTransaction,
};
use std::sync::Arc;
use tr_02_nonce_coordinator::NonceManager;
use tracing::{debug, warn};

pub struct Pipeline {
    transport: Arc<dyn LedgerTransport>,
    nonces: RwLock<Arc<dyn NonceManager>>,
    signers: SignerChain,
    gas_multiplier_permille: u64,
}

impl Pipeline {
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        nonces: Arc<dyn NonceManager>,
        gas_multiplier_permille: u64,
    ) -> Self {
        Self {
            transport,
            nonces: RwLock::new(nonces),
            signers: SignerChain::new(),
            gas_multiplier_permille,
        }
    }

    pub fn transport(&self) -> &Arc<dyn LedgerTransport> {
        &self.transport
    }

    pub fn signers(&self) -> &SignerChain {
        &self.signers
    }

    pub fn register_signer(&self, signer: Arc<dyn TransactionSigner>) {
        self.signers.register(signer);
    }

    /// Replace the nonce strategy. Allocations already in progress finish on
    /// the previous one.
    pub fn set_nonce_manager(&self, nonces: Arc<dyn NonceManager>) {
        *self.nonces.write() = nonces;
    }

    fn nonce_manager(&self) -> Arc<dyn NonceManager> {
        self.nonces.read().clone()
    }

    /// Fill in gas, price and nonce. A message without recipient is sent to
    /// the zero address, never as a contract creation.
    pub async fn new_transaction(&self, msg: &Message) -> Result<UnsignedTransaction, DispatchError> {
        let nonces = self.nonce_manager();
        let to = msg.to.unwrap_or_else(Address::zero);

        let gas = if msg.gas == 0 {
            let request = CallRequest {
                to: Some(to),
                ..msg.to_call_request()
            };
            let estimate = self.transport.estimate_gas(&request).await?;
            apply_gas_multiplier(estimate, self.gas_multiplier_permille)
        } else {
            msg.gas
        };

        let gas_price = match msg.gas_price {
            Some(price) if !price.is_zero() => price,
            _ => nonces.suggest_price().await?,
        };

        let nonce = nonces.allocate(msg.from).await?;

        Ok(UnsignedTransaction {
            nonce,
            gas_price,
            gas,
            to: Some(to),
            value: msg.value,
            data: msg.data.clone(),
        })
    }

    /// Send and wrap the outcome as a response.
    pub async fn dispatch(&self, msg: &Message) -> MessageResponse {
        match self.send_msg(msg).await {
            Ok(tx) => MessageResponse::submitted(msg.id(), tx),
            Err(e) => MessageResponse::failed(msg.id(), e),
        }
    }

    /// Dry run, send, and wrap the outcome as a response.
    pub async fn dispatch_safe(&self, msg: &Message) -> MessageResponse {
        match self.safe_send_msg(msg).await {
            Ok((tx, return_data)) => {
                MessageResponse::submitted(msg.id(), tx).with_return_data(return_data)
            }
            Err(e) => MessageResponse::failed(msg.id(), e),
        }
    }
}

#[async_trait]
impl MessageSender for Pipeline {
    async fn call_msg(&self, msg: &Message, block: Option<u64>) -> Result<Vec<u8>, DispatchError> {
        Ok(self.transport.call(&msg.to_call_request(), block).await?)
    }

    async fn send_msg(&self, msg: &Message) -> Result<SignedTransaction, DispatchError> {
        let tx = self.new_transaction(msg).await?;
        // TODO: hand the nonce back to the coordinator when signing or submission fails
        let signed = self.signers.sign(msg.from, &tx).await?;

        if let Err(e) = self.transport.send_transaction(&signed).await {
            warn!(
                msg_id = ?msg.id(),
                nonce = signed.nonce(),
                code = ?e.code(),
                reason = ?e.revert_reason(),
                "[tr-03] Submission failed"
            );
            return Err(e.into());
        }

        debug!(
            msg_id = ?msg.id(),
            tx_hash = ?signed.hash,
            from = ?msg.from,
            to = ?msg.to,
            value = %msg.value,
            "[tr-03] Message sent"
        );
        Ok(signed)
    }

    async fn safe_send_msg(
        &self,
        msg: &Message,
    ) -> Result<(SignedTransaction, Vec<u8>), DispatchError> {
        let return_data = self.call_msg(msg, None).await?;
        let tx = self.send_msg(msg).await?;
        Ok((tx, return_data))
    }
}
