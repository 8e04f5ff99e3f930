//! Hour/day rollup maintenance.
//!
//! Every accessor follows the same contract:
//! - first reference creates the bucket zeroed (token candles seeded with
//!   the current USD price) and persists it immediately;
//! - with `update = true` the live snapshot is copied in, `tx_count` is
//!   incremented and, for tokens, the candle is advanced.
//!
//! Callers add their event-specific totals to the returned bucket and save
//! it again. Fee totals are added even when `update = false`.

use bigdecimal::BigDecimal;

use crate::db::models::{
    Bundle, Factory, FactoryIntervalData, Pair, PairIntervalData, Period, Token, TokenIntervalData,
};
use crate::db::{load, save};
use crate::utils::safe_div;
use crate::worker::Engine;

impl Engine {
    pub(crate) async fn factory_bucket(
        &self,
        period: Period,
        timestamp: u64,
        factory: &Factory,
        update: bool,
    ) -> anyhow::Result<FactoryIntervalData> {
        let bucket = period.bucket(timestamp);
        let key = FactoryIntervalData::key(period, bucket);

        let mut data = match load::<FactoryIntervalData, _>(self.store(), &key).await? {
            Some(data) => data,
            None => {
                let data = FactoryIntervalData::new(period, bucket, &factory.id);
                save(self.store(), &data).await?;
                data
            },
        };

        if update {
            data.total_value_locked_native = factory.total_value_locked_native.clone();
            data.total_value_locked_usd = factory.total_value_locked_usd.clone();
            data.tx_count += 1;
            save(self.store(), &data).await?;
        }

        Ok(data)
    }

    pub(crate) async fn pair_bucket(
        &self,
        period: Period,
        timestamp: u64,
        pair: &Pair,
        update: bool,
    ) -> anyhow::Result<PairIntervalData> {
        let bucket = period.bucket(timestamp);
        let key = PairIntervalData::key(&pair.id, period, bucket);

        let mut data = match load::<PairIntervalData, _>(self.store(), &key).await? {
            Some(data) => data,
            None => {
                let mut data = PairIntervalData::new(period, bucket, &pair.id, &pair.token_x, &pair.token_y);
                data.reserve_x = pair.reserve_x.clone();
                data.reserve_y = pair.reserve_y.clone();
                data.total_value_locked_usd = pair.total_value_locked_usd.clone();
                save(self.store(), &data).await?;
                data
            },
        };

        if update {
            data.reserve_x = pair.reserve_x.clone();
            data.reserve_y = pair.reserve_y.clone();
            data.total_value_locked_usd = pair.total_value_locked_usd.clone();
            data.tx_count += 1;
            save(self.store(), &data).await?;
        }

        Ok(data)
    }

    pub(crate) async fn token_bucket(
        &self,
        period: Period,
        timestamp: u64,
        token: &Token,
        bundle: &Bundle,
        update: bool,
    ) -> anyhow::Result<TokenIntervalData> {
        let bucket = period.bucket(timestamp);
        let key = TokenIntervalData::key(&token.id, period, bucket);
        let price_usd = self.math.multiply(&token.derived_native, &bundle.native_price_usd);

        let mut data = match load::<TokenIntervalData, _>(self.store(), &key).await? {
            Some(data) => data,
            None => {
                let data = TokenIntervalData::new(period, bucket, &token.id, price_usd.clone());
                save(self.store(), &data).await?;
                data
            },
        };

        if update {
            data.tx_count += 1;
            data.total_value_locked = token.total_value_locked.clone();
            data.total_value_locked_native = self.math.validate_reserve(
                safe_div(&token.total_value_locked_usd, &bundle.native_price_usd),
                &format!("token {} totalValueLockedNative", token.id),
            );
            data.total_value_locked_usd = self.math.validate_reserve(
                token.total_value_locked_usd.clone(),
                &format!("token {} totalValueLockedUSD", token.id),
            );
            advance_candle(&mut data, price_usd);
            save(self.store(), &data).await?;
        }

        Ok(data)
    }
}

fn advance_candle(data: &mut TokenIntervalData, price_usd: BigDecimal) {
    if data.high < price_usd {
        data.high = price_usd.clone();
    }
    if data.low > price_usd {
        data.low = price_usd.clone();
    }
    data.price_usd = price_usd.clone();
    data.close = price_usd;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_candle_tracks_extremes() {
        let mut data = TokenIntervalData::new(Period::Hour, 1, "0xtoken", dec("2"));

        advance_candle(&mut data, dec("3"));
        advance_candle(&mut data, dec("1.5"));
        advance_candle(&mut data, dec("2.5"));

        assert_eq!(data.open, dec("2"));
        assert_eq!(data.high, dec("3"));
        assert_eq!(data.low, dec("1.5"));
        assert_eq!(data.close, dec("2.5"));
        assert_eq!(data.price_usd, dec("2.5"));
    }
}
