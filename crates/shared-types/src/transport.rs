//! # Ledger Transport Port
//!
//! The remote procedure capabilities the relay needs from a ledger node. Raw
//! RPC plumbing lives behind this trait and is not part of the relay.

use crate::entities::{Address, CallRequest, TxHash, U256};
use crate::errors::TransportError;
use crate::transaction::{Receipt, SignedTransaction};
use async_trait::async_trait;

#[async_trait]
pub trait LedgerTransport: Send + Sync {
    async fn chain_id(&self) -> Result<u64, TransportError>;

    /// Broadcast a signed transaction.
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<(), TransportError>;

    /// Read-only call at `block`, or at the latest block when `None`.
    async fn call(&self, call: &CallRequest, block: Option<u64>) -> Result<Vec<u8>, TransportError>;

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, TransportError>;

    async fn suggest_gas_price(&self) -> Result<U256, TransportError>;

    /// Receipt for `hash`, `None` while the transaction is not yet included.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>, TransportError>;

    async fn block_number(&self) -> Result<u64, TransportError>;

    /// Next nonce for `account`, counting pending transactions.
    async fn pending_nonce_at(&self, account: Address) -> Result<u64, TransportError>;
}
