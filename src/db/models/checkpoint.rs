use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Entity;

pub const CHECKPOINT_ID: &str = "replay";

/// Position of the last applied event.
///
/// Used to resume replay after restarts without applying an event twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub block_number: u64,
    pub log_index: u64,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            id: CHECKPOINT_ID.to_string(),
            block_number,
            log_index,
            updated_at: Utc::now(),
        }
    }

    /// Whether an event at this position was already applied.
    pub fn covers(&self, block_number: u64, log_index: u64) -> bool {
        (block_number, log_index) <= (self.block_number, self.log_index)
    }
}

impl Entity for Checkpoint {
    const KIND: &'static str = "checkpoint";

    fn id(&self) -> &str {
        &self.id
    }
}
