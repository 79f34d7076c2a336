//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::DeliveryError;
use async_trait::async_trait;
use shared_types::Message;

#[async_trait]
pub trait SafeTxDeliverer: Send + Sync {
    /// Schedule `req`, an execution of the multisig at `req.to` carrying the
    /// contract nonce `safe_nonce`.
    ///
    /// On success `req.after_msg` holds the dependency that was attached, if
    /// any.
    async fn deliver(&self, req: &mut Message, safe_nonce: u64) -> Result<(), DeliveryError>;
}
