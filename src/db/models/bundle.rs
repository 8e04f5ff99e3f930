use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

pub const BUNDLE_ID: &str = "1";

/// Native token USD price, refreshed from the oracle before each handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub native_price_usd: BigDecimal,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            id: BUNDLE_ID.to_string(),
            native_price_usd: BigDecimal::zero(),
        }
    }
}

impl Entity for Bundle {
    const KIND: &'static str = "bundle";

    fn id(&self) -> &str {
        &self.id
    }
}
