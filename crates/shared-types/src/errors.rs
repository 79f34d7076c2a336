//! # Error Types
//!
//! Errors that cross subsystem boundaries: failures reported by the ledger
//! transport and the failure carried on a `MessageResponse`.

use crate::entities::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `Error(string)` selector used by Solidity reverts.
const REVERT_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Failures from the ledger transport.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransportError {
    /// Structured JSON-RPC error with its code and optional data.
    #[error("json-rpc error {code}: {message}")]
    JsonRpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Anything the transport could not classify.
    #[error("transport error: {0}")]
    Opaque(String),
}

impl TransportError {
    pub fn json_rpc(code: i64, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self::JsonRpc {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn opaque(message: impl Into<String>) -> Self {
        Self::Opaque(message.into())
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::JsonRpc { code, .. } => Some(*code),
            Self::Opaque(_) => None,
        }
    }

    /// Revert reason carried in the error data, if the node attached one.
    pub fn revert_reason(&self) -> Option<String> {
        let Self::JsonRpc {
            data: Some(serde_json::Value::String(data)),
            ..
        } = self
        else {
            return None;
        };
        let raw = hex::decode(data.trim_start_matches("0x")).ok()?;
        decode_revert_reason(&raw)
    }
}

/// Decode ABI-encoded `Error(string)` revert data.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&REVERT_SELECTOR[..])?;
    if body.len() < 64 {
        return None;
    }
    let len = usize::try_from(u64::from_be_bytes(body[56..64].try_into().ok()?)).ok()?;
    let text = body.get(64..64usize.checked_add(len)?)?;
    String::from_utf8(text.to_vec()).ok()
}

/// Why a message did not produce a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DispatchError {
    /// No registered signer accepted the account.
    #[error("no signer authorized for account {account:?}")]
    SigningUnauthorized { account: Address },

    /// Dispatch attempted before any signer was registered.
    #[error("no signer registered")]
    NoSigners,

    /// A signer accepted the account but failed to sign.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Failure reported by the ledger transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Nonce allocation failed.
    #[error("nonce allocation failed: {0}")]
    Nonce(String),

    /// The not-after time passed before the message could be sent.
    #[error("message expired at {expiration_time}")]
    Expired { expiration_time: Timestamp },

    /// The pipeline shut down before the message was sent.
    #[error("dispatcher closed")]
    Closed,
}
