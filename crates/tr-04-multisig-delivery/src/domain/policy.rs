//! Sequence placement policy

use shared_types::{message_id_for_sequence, Address, MessageId};

/// Where a multisig execution goes relative to the contract's nonce
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Next to execute
    Immediate,
    /// Must wait for the execution of the previous sequence
    After(MessageId),
    /// Already executed on chain
    Stale,
}

/// Decide the placement of sequence `requested` on `contract` whose on-chain
/// nonce is `on_chain`.
pub fn place(contract: Address, on_chain: u64, requested: u64) -> Placement {
    use std::cmp::Ordering::*;
    match on_chain.cmp(&requested) {
        Equal => Placement::Immediate,
        Less => Placement::After(message_id_for_sequence(contract, requested - 1)),
        Greater => Placement::Stale,
    }
}
