use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use log::warn;

use crate::db::models::{Period, Swap as SwapRecord};
use crate::db::save;
use crate::utils::{address_key, safe_div};
use crate::worker::engine::{BinDelta, Outcome};
use crate::worker::events::{bin_id, DecodeError, EventMeta, Swap};
use crate::worker::Engine;

/// Raw amounts of a swap after unpacking, with its direction resolved.
struct DecodedSwap {
    bin_id: u32,
    x_in: u128,
    y_in: u128,
    x_out: u128,
    y_out: u128,
    fee_x: u128,
    fee_y: u128,
    swap_for_y: bool,
}

impl Engine {
    fn decode_swap(&self, meta: &EventMeta, event: &Swap) -> Result<DecodedSwap, DecodeError> {
        let bin_id = bin_id(U256::from(event.id))?;
        let (x_in, y_in) = self.decoding.amounts.decode(&event.amounts_in);
        let (x_out, y_out) = self.decoding.amounts.decode(&event.amounts_out);
        let (fee_x, fee_y) = self.decoding.fees.decode(&event.total_fees);

        // X -> Y when only X flows in; Y -> X when only Y flows in
        let swap_for_y = match (x_in > 0, y_in > 0) {
            (true, false) => true,
            (false, true) => false,
            _ => return Err(DecodeError::AmbiguousDirection { x_in, y_in }),
        };

        if let Some(reported) = event.swap_for_y {
            if reported != swap_for_y {
                warn!(
                    "[swap] reported direction disagrees with amounts: pair={} bin={} reported_swap_for_y={} amountXIn={} amountYIn={}",
                    meta.pair_id(),
                    bin_id,
                    reported,
                    x_in,
                    y_in
                );
            }
        }

        Ok(DecodedSwap {
            bin_id,
            x_in,
            y_in,
            x_out,
            y_out,
            fee_x,
            fee_y,
            swap_for_y,
        })
    }

    pub(crate) async fn on_swap(&self, meta: &EventMeta, event: &Swap) -> anyhow::Result<Outcome> {
        let Some(mut pair) = self.load_pair(meta, "swap").await? else {
            return Ok(Outcome::Skipped("pair not found"));
        };
        let decoded = self.decode_swap(meta, event)?;

        let market = self.refresh_market(&mut pair).await?;
        let math = self.math();
        let native_usd = market.native_price_usd().clone();

        // Remove the pair's old TVL until the new one is computed
        let mut factory = self.load_factory().await?;
        factory.total_value_locked_native = &factory.total_value_locked_native - &pair.total_value_locked_native;

        let amount_x_in = market.amount_x(decoded.x_in);
        let amount_y_in = market.amount_y(decoded.y_in);
        let amount_x_out = market.amount_x(decoded.x_out);
        let amount_y_out = market.amount_y(decoded.y_out);
        let fees_x = market.amount_x(decoded.fee_x);
        let fees_y = market.amount_y(decoded.fee_y);

        let price_x_usd = market.price_x_usd(math);
        let price_y_usd = market.price_y_usd(math);

        let fees_usd_x = math.multiply(&fees_x, &price_x_usd);
        let fees_usd_y = math.multiply(&fees_y, &price_y_usd);
        let fees_usd = &fees_usd_x + &fees_usd_y;

        // Volume counts the side that actually moved in each token, never in + out
        let (amount_x, amount_y) = if decoded.swap_for_y {
            (amount_x_in.clone(), amount_y_out.clone())
        } else {
            (amount_x_out.clone(), amount_y_in.clone())
        };
        let volume_usd_x = math.multiply(&amount_x, &price_x_usd);
        let volume_usd_y = math.multiply(&amount_y, &price_y_usd);
        let volume_usd = (&volume_usd_x + &volume_usd_y) / BigDecimal::from(2);
        let volume_native = safe_div(&volume_usd, &native_usd);

        let delta = if decoded.swap_for_y {
            BinDelta {
                x_in: amount_x_in.clone(),
                y_out: amount_y_out.clone(),
                ..Default::default()
            }
        } else {
            BinDelta {
                x_out: amount_x_out.clone(),
                y_in: amount_y_in.clone(),
                ..Default::default()
            }
        };
        let bin = self.track_bin(&pair, decoded.bin_id, delta).await?;

        // Pair
        let (next_x, next_y) = if decoded.swap_for_y {
            (&pair.reserve_x + &amount_x_in, &pair.reserve_y - &amount_y_out)
        } else {
            (&pair.reserve_x - &amount_x_out, &pair.reserve_y + &amount_y_in)
        };
        pair.reserve_x = math.validate_reserve(next_x, &format!("pair {} reserveX", pair.id));
        pair.reserve_y = math.validate_reserve(next_y, &format!("pair {} reserveY", pair.id));
        self.recompute_tvl(&mut pair, &market);

        pair.active_id = decoded.bin_id;
        pair.token_x_price = bin.price_x.clone();
        pair.token_y_price = bin.price_y.clone();
        pair.tx_count += 1;
        pair.volume_token_x += &amount_x;
        pair.volume_token_y += &amount_y;
        pair.volume_usd += &volume_usd;
        pair.fees_token_x += &fees_x;
        pair.fees_token_y += &fees_y;
        pair.fees_usd += &fees_usd;
        save(self.store(), &pair).await?;

        for period in Period::ALL {
            let mut data = self.pair_bucket(period, meta.block_timestamp, &pair, true).await?;
            data.volume_token_x += &amount_x;
            data.volume_token_y += &amount_y;
            data.volume_usd += &volume_usd;
            data.fees_usd += &fees_usd;
            save(self.store(), &data).await?;
        }

        // Factory
        factory.tx_count += 1;
        factory.volume_usd += &volume_usd;
        factory.volume_native += &volume_native;
        self.add_factory_tvl(&mut factory, &pair, &market);
        factory.fees_usd += &fees_usd;
        factory.fees_native = safe_div(&factory.fees_usd, &native_usd);
        self.touch_user(&event.to, meta.block_number, &mut factory).await?;
        save(self.store(), &factory).await?;

        for period in Period::ALL {
            let mut data = self.factory_bucket(period, meta.block_timestamp, &factory, true).await?;
            data.volume_native += &volume_native;
            data.volume_usd += &volume_usd;
            data.fees_usd += &fees_usd;
            save(self.store(), &data).await?;
        }

        // Tokens: volume and fees only, the swap itself leaves token TVL unchanged
        let mut token_x = market.token_x.clone();
        let mut token_y = market.token_y.clone();
        for (token, amount, token_volume_usd, token_fees_usd, price_usd) in [
            (&mut token_x, &amount_x, &volume_usd_x, &fees_usd_x, &price_x_usd),
            (&mut token_y, &amount_y, &volume_usd_y, &fees_usd_y, &price_y_usd),
        ] {
            token.tx_count += 1;
            token.volume += amount;
            token.volume_usd += token_volume_usd;
            token.fees_usd += token_fees_usd;
            token.total_value_locked_usd = math.validate_reserve(
                math.multiply(&token.total_value_locked, price_usd),
                &format!("token {} totalValueLockedUSD", token.id),
            );
            save(self.store(), &*token).await?;

            let volume_native = math.multiply(amount, &token.derived_native);
            for period in Period::ALL {
                let mut data = self
                    .token_bucket(period, meta.block_timestamp, token, &market.bundle, true)
                    .await?;
                data.volume += amount;
                data.volume_native += &volume_native;
                data.volume_usd += token_volume_usd;
                data.fees_usd += token_fees_usd;
                save(self.store(), &data).await?;
            }
        }

        let record = SwapRecord {
            id: meta.record_id(),
            transaction: meta.tx_id(),
            timestamp: meta.block_timestamp,
            pair: pair.id.clone(),
            sender: address_key(&event.sender),
            recipient: address_key(&event.to),
            origin: address_key(&meta.origin),
            active_id: decoded.bin_id,
            amount_x_in,
            amount_x_out,
            amount_y_in,
            amount_y_out,
            amount_usd: volume_usd,
            fees_token_x: fees_x,
            fees_token_y: fees_y,
            fees_usd,
            log_index: meta.log_index,
        };
        save(self.store(), &record).await?;

        Ok(Outcome::Applied)
    }
}
