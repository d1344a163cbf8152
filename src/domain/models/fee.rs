use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Protocol fee terms configured for one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeParamsForContract {
    /// Contract address the params apply to
    pub id: Address,
    pub fee_recipient: Address,
    pub fee_bps: U256,
    pub last_update_timestamp: u64,
}

/// Running revenue total for one (year, month, currency) bucket.
///
/// `calls_with_protocol_fee` doubles as the idempotence guard: an event id
/// already present is never re-added to `total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochCurrencyRevenue {
    pub id: String,
    pub year: i32,
    pub month: u32,
    pub currency: Address,
    pub total_amount: U256,
    /// Record ids of the fee events already folded into the total
    pub calls_with_protocol_fee: Vec<String>,
}
