use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::db::models::Period;
use crate::db::save;
use crate::worker::engine::{BinDelta, Outcome};
use crate::worker::events::{zip_bins, BinLiquidity, EventMeta};
use crate::worker::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Deposit,
    Withdraw,
}

impl Flow {
    fn handler(self) -> &'static str {
        match self {
            Flow::Deposit => "liquidity_added",
            Flow::Withdraw => "liquidity_removed",
        }
    }

    /// Signed application of `amount` onto `value`.
    fn apply(self, value: &BigDecimal, amount: &BigDecimal) -> BigDecimal {
        match self {
            Flow::Deposit => value + amount,
            Flow::Withdraw => value - amount,
        }
    }
}

impl Engine {
    pub(crate) async fn on_liquidity_added(&self, meta: &EventMeta, event: &BinLiquidity) -> anyhow::Result<Outcome> {
        self.apply_liquidity(meta, event, Flow::Deposit).await
    }

    pub(crate) async fn on_liquidity_removed(&self, meta: &EventMeta, event: &BinLiquidity) -> anyhow::Result<Outcome> {
        self.apply_liquidity(meta, event, Flow::Withdraw).await
    }

    async fn apply_liquidity(&self, meta: &EventMeta, event: &BinLiquidity, flow: Flow) -> anyhow::Result<Outcome> {
        let Some(mut pair) = self.load_pair(meta, flow.handler()).await? else {
            return Ok(Outcome::Skipped("pair not found"));
        };
        let bins: Vec<(u32, u128, u128)> = zip_bins(&event.ids, &event.amounts)?
            .into_iter()
            .map(|(bin_id, packed)| {
                let (x, y) = self.decoding.amounts.decode(packed);
                (bin_id, x, y)
            })
            .collect();

        let market = self.refresh_market(&mut pair).await?;
        let math = self.math();

        let mut total_x = BigDecimal::zero();
        let mut total_y = BigDecimal::zero();
        for (bin_id, raw_x, raw_y) in bins {
            let amount_x = market.amount_x(raw_x);
            let amount_y = market.amount_y(raw_y);
            total_x += &amount_x;
            total_y += &amount_y;

            // LP shares minted or burned are accounted on TransferBatch
            let delta = match flow {
                Flow::Deposit => BinDelta {
                    x_in: amount_x,
                    y_in: amount_y,
                    ..Default::default()
                },
                Flow::Withdraw => BinDelta {
                    x_out: amount_x,
                    y_out: amount_y,
                    ..Default::default()
                },
            };
            self.track_bin(&pair, bin_id, delta).await?;
        }

        let mut factory = self.load_factory().await?;
        factory.total_value_locked_native = &factory.total_value_locked_native - &pair.total_value_locked_native;

        // Pair
        pair.tx_count += 1;
        pair.reserve_x = math.validate_reserve(
            flow.apply(&pair.reserve_x, &total_x),
            &format!("pair {} reserveX", pair.id),
        );
        pair.reserve_y = math.validate_reserve(
            flow.apply(&pair.reserve_y, &total_y),
            &format!("pair {} reserveY", pair.id),
        );
        self.recompute_tvl(&mut pair, &market);
        save(self.store(), &pair).await?;

        // Factory
        self.add_factory_tvl(&mut factory, &pair, &market);
        factory.tx_count += 1;
        self.touch_user(&event.to, meta.block_number, &mut factory).await?;
        save(self.store(), &factory).await?;

        for period in Period::ALL {
            self.pair_bucket(period, meta.block_timestamp, &pair, true).await?;
            self.factory_bucket(period, meta.block_timestamp, &factory, true).await?;
        }

        // Tokens
        let mut token_x = market.token_x.clone();
        let mut token_y = market.token_y.clone();
        for (token, total, price_usd) in [
            (&mut token_x, &total_x, market.price_x_usd(math)),
            (&mut token_y, &total_y, market.price_y_usd(math)),
        ] {
            token.tx_count += 1;
            token.total_value_locked = math.validate_reserve(
                flow.apply(&token.total_value_locked, total),
                &format!("token {} totalValueLocked", token.id),
            );
            token.total_value_locked_usd = math.validate_reserve(
                math.multiply(&token.total_value_locked, &price_usd),
                &format!("token {} totalValueLockedUSD", token.id),
            );
            save(self.store(), &*token).await?;

            for period in Period::ALL {
                self.token_bucket(period, meta.block_timestamp, token, &market.bundle, true)
                    .await?;
            }
        }

        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_sign() {
        let value = BigDecimal::from(10);
        let amount = BigDecimal::from(4);
        assert_eq!(Flow::Deposit.apply(&value, &amount), BigDecimal::from(14));
        assert_eq!(Flow::Withdraw.apply(&value, &amount), BigDecimal::from(6));
    }
}
