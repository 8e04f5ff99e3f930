use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::db::models::{Pair, Period};
use crate::db::save;
use crate::utils::safe_div;
use crate::worker::engine::Outcome;
use crate::worker::events::{bin_id, CompositionFees, EventMeta};
use crate::worker::pricing::Market;
use crate::worker::Engine;

/// Fees of one event, in token units and USD.
pub(super) struct Fees {
    pub x: BigDecimal,
    pub y: BigDecimal,
    pub usd_x: BigDecimal,
    pub usd_y: BigDecimal,
}

impl Fees {
    pub fn new(engine: &Engine, market: &Market, raw_x: u128, raw_y: u128) -> Self {
        let x = market.amount_x(raw_x);
        let y = market.amount_y(raw_y);
        let usd_x = engine.math().multiply(&x, &market.price_x_usd(engine.math()));
        let usd_y = engine.math().multiply(&y, &market.price_y_usd(engine.math()));
        Self { x, y, usd_x, usd_y }
    }

    pub fn usd(&self) -> BigDecimal {
        &self.usd_x + &self.usd_y
    }
}

impl Engine {
    pub(crate) async fn on_composition_fees(
        &self,
        meta: &EventMeta,
        event: &CompositionFees,
    ) -> anyhow::Result<Outcome> {
        let Some(mut pair) = self.load_pair(meta, "composition_fees").await? else {
            return Ok(Outcome::Skipped("pair not found"));
        };
        bin_id(U256::from(event.id))?;
        let (raw_x, raw_y) = self.decoding.fees.decode(&event.total_fees);

        let market = self.refresh_market(&mut pair).await?;
        let fees = Fees::new(self, &market, raw_x, raw_y);

        // Fees accrue but the event is not a user transaction: no counters,
        // no rollup snapshots
        self.credit_fees(meta, &mut pair, &market, &fees, false).await?;

        Ok(Outcome::Applied)
    }

    /// Add an event's fees to the factory, both tokens, the pair and all of
    /// their rollups.
    ///
    /// With `transaction` set, transaction counters are bumped (tokens only
    /// when their own fee is non-zero) and rollups take a fresh snapshot.
    pub(super) async fn credit_fees(
        &self,
        meta: &EventMeta,
        pair: &mut Pair,
        market: &Market,
        fees: &Fees,
        transaction: bool,
    ) -> anyhow::Result<()> {
        let fees_usd = fees.usd();

        let mut factory = self.load_factory().await?;
        if transaction {
            factory.tx_count += 1;
        }
        factory.fees_usd += &fees_usd;
        factory.fees_native = safe_div(&factory.fees_usd, market.native_price_usd());
        save(self.store(), &factory).await?;

        for period in Period::ALL {
            let mut data = self
                .factory_bucket(period, meta.block_timestamp, &factory, transaction)
                .await?;
            data.fees_usd += &fees_usd;
            save(self.store(), &data).await?;
        }

        let mut token_x = market.token_x.clone();
        let mut token_y = market.token_y.clone();
        for (token, fee, fee_usd) in [
            (&mut token_x, &fees.x, &fees.usd_x),
            (&mut token_y, &fees.y, &fees.usd_y),
        ] {
            if transaction && *fee > BigDecimal::zero() {
                token.tx_count += 1;
            }
            token.fees_usd += fee_usd;
            save(self.store(), &*token).await?;

            for period in Period::ALL {
                let mut data = self
                    .token_bucket(period, meta.block_timestamp, token, &market.bundle, transaction)
                    .await?;
                data.fees_usd += fee_usd;
                save(self.store(), &data).await?;
            }
        }

        if transaction {
            pair.tx_count += 1;
        }
        pair.fees_token_x += &fees.x;
        pair.fees_token_y += &fees.y;
        pair.fees_usd += &fees_usd;
        save(self.store(), &*pair).await?;

        for period in Period::ALL {
            let mut data = self.pair_bucket(period, meta.block_timestamp, pair, transaction).await?;
            data.fees_usd += &fees_usd;
            save(self.store(), &data).await?;
        }

        Ok(())
    }
}
