//! Hour and day rollups for the factory, pair and token scopes.
//!
//! A bucket id is `timestamp / period_seconds`; the bucket start is
//! `bucket * period_seconds`. Buckets are created zeroed on first reference
//! and are never purged.

use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::db::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Hour,
    Day,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Hour, Period::Day];

    pub fn seconds(self) -> u64 {
        match self {
            Period::Hour => 3_600,
            Period::Day => 86_400,
        }
    }

    pub fn bucket(self, timestamp: u64) -> u64 {
        timestamp / self.seconds()
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Hour => "hour",
            Period::Day => "day",
        }
    }
}

// ============================================
// Factory
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryIntervalData {
    pub id: String,
    pub period: Period,
    pub bucket: u64,
    /// Bucket start (unix seconds)
    pub date: u64,
    pub factory: String,

    pub volume_native: BigDecimal,
    pub volume_usd: BigDecimal,
    pub total_value_locked_native: BigDecimal,
    pub total_value_locked_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tx_count: u64,
}

impl FactoryIntervalData {
    pub fn key(period: Period, bucket: u64) -> String {
        format!("{}-{}", period.label(), bucket)
    }

    pub fn new(period: Period, bucket: u64, factory: &str) -> Self {
        Self {
            id: Self::key(period, bucket),
            period,
            bucket,
            date: bucket * period.seconds(),
            factory: factory.to_string(),
            volume_native: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            total_value_locked_native: BigDecimal::zero(),
            total_value_locked_usd: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            tx_count: 0,
        }
    }
}

impl Entity for FactoryIntervalData {
    const KIND: &'static str = "factory_interval";

    fn id(&self) -> &str {
        &self.id
    }
}

// ============================================
// Pair
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairIntervalData {
    pub id: String,
    pub period: Period,
    pub bucket: u64,
    pub date: u64,
    pub pair: String,
    pub token_x: String,
    pub token_y: String,

    // Snapshot of the pair at the last updating event
    pub reserve_x: BigDecimal,
    pub reserve_y: BigDecimal,
    pub total_value_locked_usd: BigDecimal,

    pub volume_token_x: BigDecimal,
    pub volume_token_y: BigDecimal,
    pub volume_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub tx_count: u64,
}

impl PairIntervalData {
    pub fn key(pair: &str, period: Period, bucket: u64) -> String {
        format!("{}-{}-{}", pair, period.label(), bucket)
    }

    pub fn new(period: Period, bucket: u64, pair: &str, token_x: &str, token_y: &str) -> Self {
        Self {
            id: Self::key(pair, period, bucket),
            period,
            bucket,
            date: bucket * period.seconds(),
            pair: pair.to_string(),
            token_x: token_x.to_string(),
            token_y: token_y.to_string(),
            reserve_x: BigDecimal::zero(),
            reserve_y: BigDecimal::zero(),
            total_value_locked_usd: BigDecimal::zero(),
            volume_token_x: BigDecimal::zero(),
            volume_token_y: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            tx_count: 0,
        }
    }
}

impl Entity for PairIntervalData {
    const KIND: &'static str = "pair_interval";

    fn id(&self) -> &str {
        &self.id
    }
}

// ============================================
// Token
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIntervalData {
    pub id: String,
    pub period: Period,
    pub bucket: u64,
    pub date: u64,
    pub token: String,

    pub volume: BigDecimal,
    pub volume_native: BigDecimal,
    pub volume_usd: BigDecimal,
    pub tx_count: u64,

    pub total_value_locked: BigDecimal,
    pub total_value_locked_native: BigDecimal,
    pub total_value_locked_usd: BigDecimal,

    pub price_usd: BigDecimal,
    pub fees_usd: BigDecimal,

    // USD price candle
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
}

impl TokenIntervalData {
    pub fn key(token: &str, period: Period, bucket: u64) -> String {
        format!("{}-{}-{}", token, period.label(), bucket)
    }

    /// Fresh bucket with its candle opened at `price_usd`.
    pub fn new(period: Period, bucket: u64, token: &str, price_usd: BigDecimal) -> Self {
        Self {
            id: Self::key(token, period, bucket),
            period,
            bucket,
            date: bucket * period.seconds(),
            token: token.to_string(),
            volume: BigDecimal::zero(),
            volume_native: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            tx_count: 0,
            total_value_locked: BigDecimal::zero(),
            total_value_locked_native: BigDecimal::zero(),
            total_value_locked_usd: BigDecimal::zero(),
            price_usd: BigDecimal::zero(),
            fees_usd: BigDecimal::zero(),
            open: price_usd.clone(),
            high: price_usd.clone(),
            low: price_usd.clone(),
            close: price_usd,
        }
    }
}

impl Entity for TokenIntervalData {
    const KIND: &'static str = "token_interval";

    fn id(&self) -> &str {
        &self.id
    }
}

// ============================================
// Protocol fee collection (pair-scoped, daily)
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolFeeDayData {
    pub id: String,
    pub bucket: u64,
    pub date: u64,
    pub pair: String,

    pub amount_x: BigDecimal,
    pub amount_y: BigDecimal,
    pub collected_native: BigDecimal,
    pub collected_usd: BigDecimal,
}

impl ProtocolFeeDayData {
    pub fn key(pair: &str, bucket: u64) -> String {
        format!("{}-{}", pair, bucket)
    }

    pub fn new(bucket: u64, pair: &str) -> Self {
        Self {
            id: Self::key(pair, bucket),
            bucket,
            date: bucket * Period::Day.seconds(),
            pair: pair.to_string(),
            amount_x: BigDecimal::zero(),
            amount_y: BigDecimal::zero(),
            collected_native: BigDecimal::zero(),
            collected_usd: BigDecimal::zero(),
        }
    }
}

impl Entity for ProtocolFeeDayData {
    const KIND: &'static str = "protocol_fee_day";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_ids() {
        assert_eq!(Period::Hour.bucket(0), 0);
        assert_eq!(Period::Hour.bucket(3_599), 0);
        assert_eq!(Period::Hour.bucket(3_600), 1);
        assert_eq!(Period::Day.bucket(1_700_000_000), 19_675);
    }

    #[test]
    fn test_bucket_start_and_keys() {
        let bucket = Period::Day.bucket(1_700_000_000);
        let data = FactoryIntervalData::new(Period::Day, bucket, "1");
        assert_eq!(data.date, 1_699_920_000);
        assert_eq!(data.id, "day-19675");

        let pair = PairIntervalData::new(Period::Hour, 7, "0xpair", "0xx", "0xy");
        assert_eq!(pair.id, "0xpair-hour-7");
        assert_eq!(pair.date, 25_200);
    }
}
