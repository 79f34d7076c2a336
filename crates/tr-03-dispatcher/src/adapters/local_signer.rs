//! # Local Private-Key Signer
//!
//! secp256k1 signing of legacy transactions with EIP-155 replay protection:
//! `v = recovery_id + 35 + 2 · chain_id`.

use crate::domain::errors::SignerError;
use crate::ports::outbound::TransactionSigner;
use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use shared_types::{keccak256, Address, SignedTransaction, UnsignedTransaction, U256};

/// Derive the account address of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 prefix
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Largest recovery id byte k256 produces
const MAX_RECOVERY_ID: u64 = 3;

/// Signer holding one private key, bound to one chain.
pub struct LocalKeySigner {
    key: SigningKey,
    address: Address,
    chain_id: u64,
    /// `35 + 2 * chain_id`
    v_offset: u64,
}

impl LocalKeySigner {
    /// Fails for chain ids whose `v` would not fit in a `u64`.
    pub fn new(key: SigningKey, chain_id: u64) -> Result<Self, SignerError> {
        let v_offset = chain_id
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(35))
            .filter(|offset| offset.checked_add(MAX_RECOVERY_ID).is_some())
            .ok_or(SignerError::UnsupportedChainId(chain_id))?;
        let address = address_of(key.verifying_key());
        Ok(Self {
            key,
            address,
            chain_id,
            v_offset,
        })
    }

    /// Load a raw 32-byte private key.
    pub fn from_slice(bytes: &[u8], chain_id: u64) -> Result<Self, SignerError> {
        let key =
            SigningKey::from_slice(bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Self::new(key, chain_id)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn sign_transaction(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        let hash = tx.signing_hash(self.chain_id);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| SignerError::Failed(e.to_string()))?;

        // EIP-2: only low-s signatures are valid
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };

        let bytes = signature.to_bytes();
        let r = U256::from_big_endian(&bytes[..32]);
        let s = U256::from_big_endian(&bytes[32..]);
        let v = self.v_offset + u64::from(recovery_id.to_byte());

        Ok(SignedTransaction::new(tx.clone(), v, r, s))
    }
}

#[async_trait]
impl TransactionSigner for LocalKeySigner {
    async fn sign(
        &self,
        account: Address,
        tx: &UnsignedTransaction,
    ) -> Result<SignedTransaction, SignerError> {
        if account != self.address {
            return Err(SignerError::NotAuthorized(account));
        }
        self.sign_transaction(tx)
    }
}
