use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;
use crate::utils::ZERO_ADDRESS;

pub const FACTORY_ID: &str = "1";

/// Protocol-wide aggregates.
///
/// TVL is maintained by subtracting a pair's previous contribution and
/// adding its recomputed one, never by accumulating deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factory {
    pub id: String,

    pub pair_count: u64,
    pub token_count: u64,
    pub user_count: u64,
    pub tx_count: u64,

    pub volume_usd: BigDecimal,
    pub volume_native: BigDecimal,

    pub total_value_locked_usd: BigDecimal,
    pub total_value_locked_native: BigDecimal,

    pub fees_usd: BigDecimal,
    pub fees_native: BigDecimal,

    // Read from the factory contract once, at creation
    pub fee_recipient: String,
    pub flash_loan_fee: BigDecimal,
}

impl Default for Factory {
    fn default() -> Self {
        Self {
            id: FACTORY_ID.to_string(),
            pair_count: 0,
            token_count: 0,
            user_count: 0,
            tx_count: 0,
            volume_usd: BigDecimal::zero(),
            volume_native: BigDecimal::zero(),
            total_value_locked_usd: BigDecimal::zero(),
            total_value_locked_native: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            fees_native: BigDecimal::zero(),
            fee_recipient: ZERO_ADDRESS.to_string(),
            flash_loan_fee: BigDecimal::zero(),
        }
    }
}

impl Entity for Factory {
    const KIND: &'static str = "factory";

    fn id(&self) -> &str {
        &self.id
    }
}
