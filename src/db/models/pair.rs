use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

/// Liquidity book pair state.
///
/// Primary Key: lowercase pair address
/// TVL is recomputed from current reserves and derived prices on every
/// liquidity-affecting event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub id: String,
    pub token_x: String,
    pub token_y: String,
    pub bin_step: u16,
    pub active_id: u32,

    pub reserve_x: BigDecimal,
    pub reserve_y: BigDecimal,
    /// LP shares across all bins (sum of minted minus burned)
    pub total_supply: BigDecimal,

    pub total_value_locked_usd: BigDecimal,
    pub total_value_locked_native: BigDecimal,

    pub volume_token_x: BigDecimal,
    pub volume_token_y: BigDecimal,
    pub volume_usd: BigDecimal,

    pub fees_token_x: BigDecimal,
    pub fees_token_y: BigDecimal,
    pub fees_usd: BigDecimal,

    // Bin prices of the last swap's bin
    pub token_x_price: BigDecimal,
    pub token_y_price: BigDecimal,
    // Oracle prices at the last refresh
    pub token_x_price_usd: BigDecimal,
    pub token_y_price_usd: BigDecimal,

    pub tx_count: u64,

    pub created_at_timestamp: u64,
    pub created_at_block: u64,
}

impl Pair {
    pub fn new(
        address: &str,
        token_x: &str,
        token_y: &str,
        bin_step: u16,
        active_id: u32,
        timestamp: u64,
        block_number: u64,
    ) -> Self {
        Self {
            id: address.to_lowercase(),
            token_x: token_x.to_lowercase(),
            token_y: token_y.to_lowercase(),
            bin_step,
            active_id,
            reserve_x: BigDecimal::zero(),
            reserve_y: BigDecimal::zero(),
            total_supply: BigDecimal::zero(),
            total_value_locked_usd: BigDecimal::zero(),
            total_value_locked_native: BigDecimal::zero(),
            volume_token_x: BigDecimal::zero(),
            volume_token_y: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            fees_token_x: BigDecimal::zero(),
            fees_token_y: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            token_x_price: BigDecimal::zero(),
            token_y_price: BigDecimal::zero(),
            token_x_price_usd: BigDecimal::zero(),
            token_y_price_usd: BigDecimal::zero(),
            tx_count: 0,
            created_at_timestamp: timestamp,
            created_at_block: block_number,
        }
    }
}

impl Entity for Pair {
    const KIND: &'static str = "pair";

    fn id(&self) -> &str {
        &self.id
    }
}
