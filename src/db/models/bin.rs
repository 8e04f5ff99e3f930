use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

/// One price bin of a pair.
///
/// Primary Key: `{pair}#{bin_id}`
/// Prices are fixed at creation; reserves and supply only move by deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bin {
    pub id: String,
    pub pair: String,
    pub bin_id: u32,

    pub reserve_x: BigDecimal,
    pub reserve_y: BigDecimal,
    /// Outstanding LP shares (raw integer units)
    pub total_supply: BigDecimal,

    // Static prices (price_x = 1 / price_y)
    pub price_x: BigDecimal,
    pub price_y: BigDecimal,

    pub liquidity_provider_count: u64,
}

impl Bin {
    pub fn key(pair: &str, bin_id: u32) -> String {
        format!("{}#{}", pair, bin_id)
    }

    pub fn new(pair: &str, bin_id: u32, price_x: BigDecimal, price_y: BigDecimal) -> Self {
        Self {
            id: Self::key(pair, bin_id),
            pair: pair.to_string(),
            bin_id,
            reserve_x: BigDecimal::zero(),
            reserve_y: BigDecimal::zero(),
            total_supply: BigDecimal::zero(),
            price_x,
            price_y,
            liquidity_provider_count: 0,
        }
    }
}

impl Entity for Bin {
    const KIND: &'static str = "bin";

    fn id(&self) -> &str {
        &self.id
    }
}
