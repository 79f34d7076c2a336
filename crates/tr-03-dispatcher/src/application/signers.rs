//! Ordered signer registry
//!
//! Signers are tried in registration order. The first one that does not
//! answer `NotAuthorized` decides the outcome, so registering a catch-all
//! signer early shadows every signer registered after it.

use crate::domain::errors::SignerError;
use crate::ports::outbound::TransactionSigner;
use parking_lot::RwLock;
use shared_types::{Address, DispatchError, SignedTransaction, UnsignedTransaction};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
pub struct SignerChain {
    signers: RwLock<Vec<Arc<dyn TransactionSigner>>>,
}

impl SignerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, signer: Arc<dyn TransactionSigner>) {
        let mut signers = self.signers.write();
        signers.push(signer);
        info!(count = signers.len(), "[tr-03] Signer registered");
    }

    pub fn len(&self) -> usize {
        self.signers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.read().is_empty()
    }

    pub async fn sign(
        &self,
        account: Address,
        tx: &UnsignedTransaction,
    ) -> Result<SignedTransaction, DispatchError> {
        let signers = self.signers.read().clone();
        if signers.is_empty() {
            return Err(DispatchError::NoSigners);
        }

        for (index, signer) in signers.iter().enumerate() {
            match signer.sign(account, tx).await {
                Ok(signed) => return Ok(signed),
                Err(SignerError::NotAuthorized(_)) => {
                    debug!(index, account = ?account, "[tr-03] Signer not authorized, trying next");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DispatchError::SigningUnauthorized { account })
    }
}
