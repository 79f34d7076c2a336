//! In-memory ledger double used by the relay test suites.
//!
//! Every submitted transaction is mined into its own block immediately, so
//! confirmation depth grows only through `advance_blocks`.

use crate::entities::{Address, CallRequest, TxHash, U256};
use crate::errors::TransportError;
use crate::transaction::{Receipt, SignedTransaction};
use crate::transport::LedgerTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct LedgerState {
    block_number: u64,
    pending_nonces: HashMap<Address, u64>,
    sent: Vec<SignedTransaction>,
    receipts: HashMap<TxHash, Receipt>,
    call_results: HashMap<Address, Vec<u8>>,
    call_error: Option<TransportError>,
    send_error: Option<TransportError>,
    nonce_error: Option<TransportError>,
    failing_receipt_polls: usize,
    gas_estimate: u64,
    gas_price: U256,
    estimate_calls: usize,
}

pub struct MockLedger {
    chain_id: u64,
    state: Mutex<LedgerState>,
}

impl MockLedger {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(LedgerState {
                gas_estimate: 21_000,
                gas_price: U256::from(1_000_000_000u64),
                ..Default::default()
            }),
        }
    }

    pub fn with_pending_nonce(self, account: Address, nonce: u64) -> Self {
        self.state.lock().pending_nonces.insert(account, nonce);
        self
    }

    pub fn set_pending_nonce(&self, account: Address, nonce: u64) {
        self.state.lock().pending_nonces.insert(account, nonce);
    }

    pub fn set_call_result(&self, to: Address, data: Vec<u8>) {
        self.state.lock().call_results.insert(to, data);
    }

    pub fn set_call_error(&self, err: Option<TransportError>) {
        self.state.lock().call_error = err;
    }

    pub fn set_send_error(&self, err: Option<TransportError>) {
        self.state.lock().send_error = err;
    }

    pub fn set_pending_nonce_error(&self, err: Option<TransportError>) {
        self.state.lock().nonce_error = err;
    }

    pub fn set_gas_estimate(&self, gas: u64) {
        self.state.lock().gas_estimate = gas;
    }

    pub fn set_gas_price(&self, price: U256) {
        self.state.lock().gas_price = price;
    }

    /// Make the next `n` receipt lookups fail with a transport error.
    pub fn fail_receipt_polls(&self, n: usize) {
        self.state.lock().failing_receipt_polls = n;
    }

    pub fn advance_blocks(&self, n: u64) {
        self.state.lock().block_number += n;
    }

    pub fn sent(&self) -> Vec<SignedTransaction> {
        self.state.lock().sent.clone()
    }

    pub fn estimate_calls(&self) -> usize {
        self.state.lock().estimate_calls
    }
}

#[async_trait]
impl LedgerTransport for MockLedger {
    async fn chain_id(&self) -> Result<u64, TransportError> {
        Ok(self.chain_id)
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if let Some(err) = state.send_error.clone() {
            return Err(err);
        }
        state.block_number += 1;
        let receipt = Receipt {
            tx_hash: tx.hash,
            block_number: state.block_number,
            status: true,
            gas_used: tx.tx.gas,
        };
        state.receipts.insert(tx.hash, receipt);
        state.sent.push(tx.clone());
        Ok(())
    }

    async fn call(&self, call: &CallRequest, _block: Option<u64>) -> Result<Vec<u8>, TransportError> {
        let state = self.state.lock();
        if let Some(err) = state.call_error.clone() {
            return Err(err);
        }
        Ok(call
            .to
            .and_then(|to| state.call_results.get(&to).cloned())
            .unwrap_or_default())
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> Result<u64, TransportError> {
        let mut state = self.state.lock();
        state.estimate_calls += 1;
        Ok(state.gas_estimate)
    }

    async fn suggest_gas_price(&self) -> Result<U256, TransportError> {
        Ok(self.state.lock().gas_price)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>, TransportError> {
        let mut state = self.state.lock();
        if state.failing_receipt_polls > 0 {
            state.failing_receipt_polls -= 1;
            return Err(TransportError::opaque("receipt lookup failed"));
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        Ok(self.state.lock().block_number)
    }

    async fn pending_nonce_at(&self, account: Address) -> Result<u64, TransportError> {
        let state = self.state.lock();
        if let Some(err) = state.nonce_error.clone() {
            return Err(err);
        }
        Ok(state.pending_nonces.get(&account).copied().unwrap_or(0))
    }
}
