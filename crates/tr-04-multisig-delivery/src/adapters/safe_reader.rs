//! Contract nonce reader over the ledger transport

use crate::domain::errors::DeliveryError;
use crate::ports::outbound::SafeNonceReader;
use async_trait::async_trait;
use shared_types::{Address, CallRequest, LedgerTransport};
use std::sync::Arc;

/// `nonce()` function selector
pub const NONCE_SELECTOR: [u8; 4] = [0xaf, 0xfe, 0xd0, 0xe0];

/// Reads the nonce with an `eth_call` to `nonce()`.
pub struct TransportSafeNonceReader {
    contract: Address,
    transport: Arc<dyn LedgerTransport>,
}

impl TransportSafeNonceReader {
    pub fn new(contract: Address, transport: Arc<dyn LedgerTransport>) -> Self {
        Self {
            contract,
            transport,
        }
    }
}

#[async_trait]
impl SafeNonceReader for TransportSafeNonceReader {
    async fn nonce(&self) -> Result<u64, DeliveryError> {
        let call = CallRequest {
            to: Some(self.contract),
            data: NONCE_SELECTOR.to_vec(),
            ..Default::default()
        };
        let output = self.transport.call(&call, None).await?;
        decode_uint64(&output)
    }
}

/// Factory used when no other one was configured.
pub fn default_reader_factory(
    contract: Address,
    transport: Arc<dyn LedgerTransport>,
) -> Result<Arc<dyn SafeNonceReader>, DeliveryError> {
    Ok(Arc::new(TransportSafeNonceReader::new(contract, transport)))
}

/// Decode an ABI `uint256` word that must fit in 64 bits.
fn decode_uint64(output: &[u8]) -> Result<u64, DeliveryError> {
    let word = output.get(..32).ok_or_else(|| {
        DeliveryError::MalformedOutput(format!("expected 32 bytes, got {}", output.len()))
    })?;
    if word[..24].iter().any(|b| *b != 0) {
        return Err(DeliveryError::MalformedOutput("nonce exceeds u64".into()));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::testing::MockLedger;

    fn word(n: u64) -> Vec<u8> {
        let mut out = vec![0u8; 32];
        out[24..].copy_from_slice(&n.to_be_bytes());
        out
    }

    #[tokio::test]
    async fn test_reads_nonce_from_call() {
        let ledger = Arc::new(MockLedger::new(1));
        let safe = Address::from_low_u64_be(0x5afe);
        ledger.set_call_result(safe, word(17));

        let reader = default_reader_factory(safe, ledger).unwrap();
        assert_eq!(reader.nonce().await.unwrap(), 17);
    }

    #[test]
    fn test_decode_rejects_short_and_wide_output() {
        assert!(matches!(
            decode_uint64(&[0u8; 4]),
            Err(DeliveryError::MalformedOutput(_))
        ));
        let mut wide = word(1);
        wide[0] = 1;
        assert!(matches!(
            decode_uint64(&wide),
            Err(DeliveryError::MalformedOutput(_))
        ));
    }
}
