use serde::{Deserialize, Serialize};

use crate::db::Entity;

/// Latest static fee parameters of a pair (one row per pair, latest wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairParameterSet {
    pub id: String,
    pub pair: String,
    pub sender: String,
    pub base_factor: u16,
    pub filter_period: u16,
    pub decay_period: u16,
    pub reduction_factor: u16,
    pub variable_fee_control: u32,
    /// Basis points
    pub protocol_share: u16,
    /// `protocol_share / 100`, integer division (250 -> 2)
    pub protocol_share_pct: u16,
    pub max_volatility_accumulator: u32,
    pub updated_at_block: u64,
}

impl PairParameterSet {
    pub fn new(pair: &str) -> Self {
        Self {
            id: pair.to_string(),
            pair: pair.to_string(),
            sender: String::new(),
            base_factor: 0,
            filter_period: 0,
            decay_period: 0,
            reduction_factor: 0,
            variable_fee_control: 0,
            protocol_share: 0,
            protocol_share_pct: 0,
            max_volatility_accumulator: 0,
            updated_at_block: 0,
        }
    }
}

impl Entity for PairParameterSet {
    const KIND: &'static str = "pair_parameters";

    fn id(&self) -> &str {
        &self.id
    }
}
