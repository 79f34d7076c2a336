//! Configuration for Multisig Delivery

use serde::{Deserialize, Serialize};
use shared_types::Address;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Only account allowed to submit multisig executions
    pub relayer: Address,
}
