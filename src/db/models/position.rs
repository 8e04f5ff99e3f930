use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

/// Any address seen as a swap recipient, liquidity recipient or LP holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_seen_block: u64,
}

impl Entity for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }
}

/// LP share balance of one user in one bin.
///
/// Primary Key: `{pair}#{user}#{bin_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub id: String,
    pub pair: String,
    pub user: String,
    pub bin_id: u32,
    pub balance: BigDecimal,
    pub updated_at_block: u64,
}

impl LiquidityPosition {
    pub fn key(pair: &str, user: &str, bin_id: u32) -> String {
        format!("{}#{}#{}", pair, user, bin_id)
    }

    pub fn new(pair: &str, user: &str, bin_id: u32) -> Self {
        Self {
            id: Self::key(pair, user, bin_id),
            pair: pair.to_string(),
            user: user.to_string(),
            bin_id,
            balance: BigDecimal::zero(),
            updated_at_block: 0,
        }
    }
}

impl Entity for LiquidityPosition {
    const KIND: &'static str = "liquidity_position";

    fn id(&self) -> &str {
        &self.id
    }
}
