//! # Ledger Transactions
//!
//! Legacy (EIP-155) transactions as built by the dispatcher, and receipts as
//! returned by the ledger.

use crate::entities::{Address, TxHash, U256};
use crate::ids::keccak256;
use primitive_types::H256;
use rlp::RlpStream;
use serde::{Deserialize, Serialize};

/// Transaction ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
}

impl UnsignedTransaction {
    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas);
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// EIP-155 signing hash: `keccak(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))`.
    pub fn signing_hash(&self, chain_id: u64) -> H256 {
        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(stream.as_raw())
    }
}

/// Signed transaction with its raw encoding and hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub v: u64,
    pub r: U256,
    pub s: U256,
    /// `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`
    pub raw: Vec<u8>,
    pub hash: TxHash,
}

impl SignedTransaction {
    pub fn new(tx: UnsignedTransaction, v: u64, r: U256, s: U256) -> Self {
        let mut stream = RlpStream::new_list(9);
        tx.append_fields(&mut stream);
        stream.append(&v);
        stream.append(&r);
        stream.append(&s);
        let raw = stream.as_raw().to_vec();
        let hash = keccak256(&raw);
        Self {
            tx,
            v,
            r,
            s,
            raw,
            hash,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.tx.nonce
    }
}

/// Inclusion receipt for a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `true` when execution succeeded
    pub status: bool,
    pub gas_used: u64,
}
