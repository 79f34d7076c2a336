//! # Message Identifiers
//!
//! Random ids for ordinary messages and deterministic ids for messages bound
//! to a multisig contract's execution counter.

use crate::entities::{Address, Message, MessageId};
use primitive_types::H256;
use sha3::{Digest, Keccak256};
use uuid::Uuid;

pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// Fresh id derived from a random UUID.
pub fn new_message_id() -> MessageId {
    keccak256(Uuid::new_v4().as_bytes())
}

/// Replace the message id with a fresh random one.
pub fn assign_message_id(msg: &mut Message) -> &mut Message {
    msg.set_id(new_message_id());
    msg
}

/// Id of the message that executes `sequence` on `contract`.
///
/// `keccak256(contract ‖ uint256(sequence))`. Both the delivery adapter (when
/// it synthesizes a dependency) and whoever stores the multisig message must
/// use this function.
pub fn message_id_for_sequence(contract: Address, sequence: u64) -> MessageId {
    let mut preimage = [0u8; 52];
    preimage[..20].copy_from_slice(contract.as_bytes());
    preimage[44..].copy_from_slice(&sequence.to_be_bytes());
    keccak256(&preimage)
}
