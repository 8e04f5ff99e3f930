use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use log::warn;
use num_traits::Zero;

use crate::db::models::{LiquidityPosition, Pair, Period, Transfer};
use crate::db::{load_or_create, save};
use crate::utils::{address_key, u256_to_big_decimal};
use crate::worker::engine::{BinDelta, Outcome};
use crate::worker::events::{zip_bins, EventMeta, TransferBatch};
use crate::worker::Engine;

impl Engine {
    /// LP share movements: mints, burns and holder-to-holder transfers.
    pub(crate) async fn on_transfer_batch(&self, meta: &EventMeta, event: &TransferBatch) -> anyhow::Result<Outcome> {
        let Some(mut pair) = self.load_pair(meta, "transfer_batch").await? else {
            return Ok(Outcome::Skipped("pair not found"));
        };
        let shares: Vec<(u32, BigDecimal)> = zip_bins(&event.ids, &event.amounts)?
            .into_iter()
            .map(|(bin_id, amount)| (bin_id, u256_to_big_decimal(*amount)))
            .collect();

        let is_mint = event.from == Address::ZERO;
        let is_burn = event.to == Address::ZERO;

        pair.tx_count += 1;
        let mut factory = self.load_factory().await?;
        factory.tx_count += 1;

        for (index, (bin_id, amount)) in shares.into_iter().enumerate() {
            if !is_mint {
                self.move_position(&pair, &event.from, bin_id, &amount, false, meta.block_number)
                    .await?;
            }
            if !is_burn {
                self.move_position(&pair, &event.to, bin_id, &amount, true, meta.block_number)
                    .await?;
                self.touch_user(&event.to, meta.block_number, &mut factory).await?;
            }

            if is_mint {
                let delta = BinDelta {
                    minted: amount.clone(),
                    ..Default::default()
                };
                self.track_bin(&pair, bin_id, delta).await?;
                pair.total_supply += &amount;
            }
            if is_burn {
                let delta = BinDelta {
                    burned: amount.clone(),
                    ..Default::default()
                };
                self.track_bin(&pair, bin_id, delta).await?;
                pair.total_supply -= &amount;
            }

            let record = Transfer {
                id: format!("{}#{}", meta.record_id(), index),
                transaction: meta.tx_id(),
                timestamp: meta.block_timestamp,
                pair: pair.id.clone(),
                is_batch: true,
                batch_index: index as u32,
                is_mint,
                is_burn,
                bin_id,
                amount,
                sender: address_key(&event.sender),
                from: address_key(&event.from),
                to: address_key(&event.to),
                origin: address_key(&meta.origin),
                log_index: meta.log_index,
            };
            save(self.store(), &record).await?;
        }

        save(self.store(), &pair).await?;
        save(self.store(), &factory).await?;

        for period in Period::ALL {
            self.factory_bucket(period, meta.block_timestamp, &factory, true).await?;
            self.pair_bucket(period, meta.block_timestamp, &pair, true).await?;
        }

        Ok(Outcome::Applied)
    }

    /// Credit or debit a holder's share balance in one bin, keeping the
    /// bin's provider count in step with balances crossing zero.
    async fn move_position(
        &self,
        pair: &Pair,
        holder: &Address,
        bin_id: u32,
        amount: &BigDecimal,
        credit: bool,
        block_number: u64,
    ) -> anyhow::Result<()> {
        let user = address_key(holder);
        let (mut position, _) = load_or_create(
            self.store(),
            &LiquidityPosition::key(&pair.id, &user, bin_id),
            || LiquidityPosition::new(&pair.id, &user, bin_id),
        )
        .await?;

        let before = position.balance.clone();
        let after = if credit { &before + amount } else { &before - amount };
        position.balance = if after < BigDecimal::zero() {
            warn!(
                "[transfer_batch] position balance would go negative, clamping to 0: pair={} user={} bin={} balance={} amount={}",
                pair.id, user, bin_id, before, amount
            );
            BigDecimal::zero()
        } else {
            after
        };
        position.updated_at_block = block_number;
        save(self.store(), &position).await?;

        let opened = before.is_zero() && !position.balance.is_zero();
        let closed = !before.is_zero() && position.balance.is_zero();
        if opened || closed {
            let mut bin = self.load_bin(pair, bin_id).await?;
            if opened {
                bin.liquidity_provider_count += 1;
            } else {
                bin.liquidity_provider_count = bin.liquidity_provider_count.saturating_sub(1);
            }
            save(self.store(), &bin).await?;
        }

        Ok(())
    }
}
