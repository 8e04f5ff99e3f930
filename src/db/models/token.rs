use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

/// Token metadata and running aggregates.
///
/// Primary Key: lowercase address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,

    // On-chain metadata (immutable after creation)
    pub symbol: String,
    pub name: String,
    pub decimals: u8,

    /// Price in native token units, from the oracle
    pub derived_native: BigDecimal,

    pub volume: BigDecimal,
    pub volume_usd: BigDecimal,
    pub total_value_locked: BigDecimal,
    pub total_value_locked_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tx_count: u64,
    pub pair_count: u64,
}

impl Token {
    pub fn new(address: &str, symbol: String, name: String, decimals: u8) -> Self {
        Self {
            id: address.to_lowercase(),
            symbol,
            name,
            decimals,
            derived_native: BigDecimal::zero(),
            volume: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            total_value_locked: BigDecimal::zero(),
            total_value_locked_usd: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            tx_count: 0,
            pair_count: 0,
        }
    }
}

impl Entity for Token {
    const KIND: &'static str = "token";

    fn id(&self) -> &str {
        &self.id
    }
}
