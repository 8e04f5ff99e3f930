//! Append-only audit records. Written once per event and never mutated.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swap {
    /// `{tx}#{log_index}`
    pub id: String,
    pub transaction: String,
    pub timestamp: u64,
    pub pair: String,
    pub sender: String,
    pub recipient: String,
    pub origin: String,
    pub active_id: u32,
    pub amount_x_in: BigDecimal,
    pub amount_x_out: BigDecimal,
    pub amount_y_in: BigDecimal,
    pub amount_y_out: BigDecimal,
    pub amount_usd: BigDecimal,
    pub fees_token_x: BigDecimal,
    pub fees_token_y: BigDecimal,
    pub fees_usd: BigDecimal,
    pub log_index: u64,
}

impl Entity for Swap {
    const KIND: &'static str = "swap";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    /// `{tx}#{log_index}`
    pub id: String,
    pub transaction: String,
    pub timestamp: u64,
    pub pair: String,
    pub sender: String,
    pub recipient: String,
    pub origin: String,
    pub amount_x: BigDecimal,
    pub amount_y: BigDecimal,
    pub amount_usd: BigDecimal,
    pub fees_x: BigDecimal,
    pub fees_y: BigDecimal,
    pub fees_usd: BigDecimal,
    pub log_index: u64,
}

impl Entity for Flash {
    const KIND: &'static str = "flash";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One `(bin, amount)` entry of an LP share batch transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// `{tx}#{log_index}#{batch_index}`
    pub id: String,
    pub transaction: String,
    pub timestamp: u64,
    pub pair: String,
    pub is_batch: bool,
    pub batch_index: u32,
    pub is_mint: bool,
    pub is_burn: bool,
    pub bin_id: u32,
    pub amount: BigDecimal,
    pub sender: String,
    pub from: String,
    pub to: String,
    pub origin: String,
    pub log_index: u64,
}

impl Entity for Transfer {
    const KIND: &'static str = "transfer";

    fn id(&self) -> &str {
        &self.id
    }
}
