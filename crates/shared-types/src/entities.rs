//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `MessageId`, `TxHash`
//! - **Requests**: `Message`, `CallRequest`, `AccessListItem`
//! - **Results**: `MessageResponse`

use crate::errors::DispatchError;
use crate::ids::new_message_id;
use crate::transaction::SignedTransaction;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Re-export the fixed-width primitives used across all subsystems
pub use primitive_types::{H160, H256, U256};

/// A 20-byte account or contract address.
pub type Address = H160;

/// Identifier of a message flowing through the relay.
pub type MessageId = H256;

/// Hash of a signed transaction.
pub type TxHash = H256;

/// Milliseconds since the Unix epoch. Zero means "unset".
pub type Timestamp = u64;

/// Current wall-clock time in milliseconds.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as Timestamp
}

/// One EIP-2930 access list entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<H256>,
}

/// Request to execute a call or transaction against the ledger.
///
/// `id` is assigned once, at construction or through
/// [`assign_message_id`](crate::ids::assign_message_id), and is never changed
/// by the pipeline. The pipeline only ever attaches `after_msg` and `resp`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    /// Sending account
    pub from: Address,
    /// Destination; `None` creates a contract
    pub to: Option<Address>,
    /// Call data
    pub data: Vec<u8>,
    /// Transferred value
    pub value: U256,
    /// Gas limit; zero means "estimate"
    pub gas: u64,
    /// Gas price; `None` or zero means "ask the coordinator"
    pub gas_price: Option<U256>,
    pub access_list: Vec<AccessListItem>,
    /// Not-before time
    pub start_time: Timestamp,
    /// Not-after time
    pub expiration_time: Timestamp,
    /// Re-execution period; zero means one-shot
    pub interval: Duration,
    /// Message that must be responded before this one may dispatch
    pub after_msg: Option<MessageId>,
    /// Response recorded once the message was dispatched
    pub resp: Option<MessageResponse>,
}

impl Message {
    /// Create a message with a fresh random id.
    pub fn new(from: Address, to: Option<Address>) -> Self {
        Self::with_id(new_message_id(), from, to)
    }

    /// Create a message under a caller-chosen id (e.g. a multisig sequence id).
    pub fn with_id(id: MessageId, from: Address, to: Option<Address>) -> Self {
        Self {
            id,
            from,
            to,
            data: Vec::new(),
            value: U256::zero(),
            gas: 0,
            gas_price: None,
            access_list: Vec::new(),
            start_time: 0,
            expiration_time: 0,
            interval: Duration::ZERO,
            after_msg: None,
            resp: None,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: MessageId) {
        self.id = id;
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn after(mut self, dependency: MessageId) -> Self {
        self.after_msg = Some(dependency);
        self
    }

    pub fn starting_at(mut self, start_time: Timestamp) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn expiring_at(mut self, expiration_time: Timestamp) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Whether the not-after time has passed. A zero expiration never expires.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiration_time != 0 && now > self.expiration_time
    }

    pub fn is_recurring(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Whether dispatch must wait for the not-before time.
    pub fn is_deferred(&self, now: Timestamp) -> bool {
        self.start_time > now
    }

    /// The read-only view of this message used for estimation and dry runs.
    pub fn to_call_request(&self) -> CallRequest {
        CallRequest {
            from: self.from,
            to: self.to,
            gas: (self.gas != 0).then_some(self.gas),
            gas_price: self.gas_price,
            value: self.value,
            data: self.data.clone(),
            access_list: self.access_list.clone(),
        }
    }
}

/// Read-only call against the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub from: Address,
    pub to: Option<Address>,
    pub gas: Option<u64>,
    pub gas_price: Option<U256>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
}

/// Outcome of dispatching one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: MessageId,
    /// Submitted transaction, when submission happened
    pub tx: Option<SignedTransaction>,
    /// Dry-run result bytes for safe sends
    pub return_data: Option<Vec<u8>>,
    pub err: Option<DispatchError>,
}

impl MessageResponse {
    pub fn submitted(id: MessageId, tx: SignedTransaction) -> Self {
        Self {
            id,
            tx: Some(tx),
            return_data: None,
            err: None,
        }
    }

    pub fn failed(id: MessageId, err: DispatchError) -> Self {
        Self {
            id,
            tx: None,
            return_data: None,
            err: Some(err),
        }
    }

    pub fn with_return_data(mut self, return_data: Vec<u8>) -> Self {
        self.return_data = Some(return_data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.tx.as_ref().map(|tx| tx.hash)
    }
}
