//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::DeliveryError;
use async_trait::async_trait;
use shared_types::{Address, LedgerTransport};
use std::sync::Arc;

/// Reads the execution counter of one multisig contract.
#[async_trait]
pub trait SafeNonceReader: Send + Sync {
    async fn nonce(&self) -> Result<u64, DeliveryError>;
}

/// Builds the reader for a contract the deliverer has not seen yet.
///
/// Readers are cached per contract and may be created more than once under
/// concurrent first use, so they must not carry state.
pub trait SafeReaderFactory: Send + Sync {
    fn create(
        &self,
        contract: Address,
        transport: Arc<dyn LedgerTransport>,
    ) -> Result<Arc<dyn SafeNonceReader>, DeliveryError>;
}

impl<F> SafeReaderFactory for F
where
    F: Fn(Address, Arc<dyn LedgerTransport>) -> Result<Arc<dyn SafeNonceReader>, DeliveryError>
        + Send
        + Sync,
{
    fn create(
        &self,
        contract: Address,
        transport: Arc<dyn LedgerTransport>,
    ) -> Result<Arc<dyn SafeNonceReader>, DeliveryError> {
        self(contract, transport)
    }
}
