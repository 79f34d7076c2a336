//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::SignerError;
use async_trait::async_trait;
use shared_types::{Address, SignedTransaction, UnsignedTransaction};

/// Something that can sign transactions for some set of accounts.
///
/// Returns [`SignerError::NotAuthorized`] for accounts it does not hold a key
/// for, so that the next registered signer gets a chance.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(
        &self,
        account: Address,
        tx: &UnsignedTransaction,
    ) -> Result<SignedTransaction, SignerError>;
}

#[async_trait]
impl<F> TransactionSigner for F
where
    F: Fn(Address, &UnsignedTransaction) -> Result<SignedTransaction, SignerError> + Send + Sync,
{
    async fn sign(
        &self,
        account: Address,
        tx: &UnsignedTransaction,
    ) -> Result<SignedTransaction, SignerError> {
        self(account, tx)
    }
}
