use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::Context;
use bigdecimal::BigDecimal;
use log::{debug, info, warn};

use crate::config::{DecodingSettings, EngineSettings};
use crate::db::models::{Bin, Factory, Pair, Token, User, FACTORY_ID};
use crate::db::{self, load, save, Store};
use crate::utils::{address_key, price_of_bin, u256_to_big_decimal, SafeMath, ZERO_ADDRESS};
use crate::worker::events::{EventMeta, LogEvent, PairEvent};
use crate::worker::pricing::{FactoryReader, Market, PriceOracle};

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing was mutated
    Skipped(&'static str),
}

/// Flow deltas applied to a single bin.
#[derive(Debug, Clone, Default)]
pub struct BinDelta {
    pub x_in: BigDecimal,
    pub x_out: BigDecimal,
    pub y_in: BigDecimal,
    pub y_out: BigDecimal,
    pub minted: BigDecimal,
    pub burned: BigDecimal,
}

/// Event accounting engine for liquidity book pairs.
///
/// Applies one event at a time, in chain order. Each handler runs to
/// completion (awaiting store and oracle calls) before the next event is
/// accepted, which `handle` enforces by taking `&mut self`. Factory and
/// bundle state is loaded from the injected store on every call.
pub struct Engine {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) prices: Arc<dyn PriceOracle>,
    pub(crate) factory_reads: Arc<dyn FactoryReader>,
    pub(crate) math: SafeMath,
    pub(crate) decoding: DecodingSettings,
    pub(crate) price_precision: u64,
}

impl Engine {
    pub fn new(
        store: Arc<dyn Store>,
        prices: Arc<dyn PriceOracle>,
        factory_reads: Arc<dyn FactoryReader>,
        settings: &EngineSettings,
    ) -> anyhow::Result<Self> {
        let math = SafeMath::from_settings(&settings.arithmetic)?;

        Ok(Self {
            store,
            prices,
            factory_reads,
            math,
            decoding: settings.decoding.clone(),
            price_precision: settings.pricing.price_precision,
        })
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn math(&self) -> &SafeMath {
        &self.math
    }

    /// Apply a single event.
    ///
    /// Decode errors are returned before anything is written. A missing pair
    /// is logged and reported as [`Outcome::Skipped`].
    pub async fn handle(&mut self, event: &LogEvent) -> anyhow::Result<Outcome> {
        let meta = &event.meta;
        let outcome = match &event.event {
            PairEvent::PairCreated(e) => self.on_pair_created(meta, e).await,
            PairEvent::Swap(e) => self.on_swap(meta, e).await,
            PairEvent::FlashLoan(e) => self.on_flash_loan(meta, e).await,
            PairEvent::CompositionFees(e) => self.on_composition_fees(meta, e).await,
            PairEvent::DepositedToBins(e) => self.on_liquidity_added(meta, e).await,
            PairEvent::WithdrawnFromBins(e) => self.on_liquidity_removed(meta, e).await,
            PairEvent::CollectedProtocolFees(e) => self.on_protocol_fees_collected(meta, e).await,
            PairEvent::TransferBatch(e) => self.on_transfer_batch(meta, e).await,
            PairEvent::StaticFeeParametersSet(e) => self.on_static_fee_parameters_set(meta, e).await,
        }
        .with_context(|| {
            format!(
                "{} failed for pair={} block={} log_index={}",
                event.event.name(),
                meta.pair_id(),
                meta.block_number,
                meta.log_index
            )
        })?;

        debug!(
            "[engine] {} pair={} block={} log_index={} -> {:?}",
            event.event.name(),
            meta.pair_id(),
            meta.block_number,
            meta.log_index,
            outcome
        );

        Ok(outcome)
    }

    // ============================================
    // Entity access shared by handlers
    // ============================================

    /// Load the event's pair, logging when it is unknown.
    pub(crate) async fn load_pair(&self, meta: &EventMeta, handler: &str) -> anyhow::Result<Option<Pair>> {
        let pair = load::<Pair, _>(self.store(), &meta.pair_id()).await?;
        if pair.is_none() {
            warn!(
                "[{}] pair not found, skipping: pair={} block={} log_index={}",
                handler,
                meta.pair_id(),
                meta.block_number,
                meta.log_index
            );
        }
        Ok(pair)
    }

    /// Tokens are created with their pair, so a missing one means the
    /// store is inconsistent.
    pub(crate) async fn load_token(&self, id: &str) -> anyhow::Result<Token> {
        load::<Token, _>(self.store(), id)
            .await?
            .with_context(|| format!("token {} referenced by a pair is missing", id))
    }

    /// Load the factory singleton, reading fee recipient and flash loan fee
    /// from the factory contract when it is first created.
    pub(crate) async fn load_factory(&self) -> anyhow::Result<Factory> {
        if let Some(factory) = load::<Factory, _>(self.store(), FACTORY_ID).await? {
            return Ok(factory);
        }

        let mut factory = Factory::default();

        match self.factory_reads.fee_recipient().await {
            Ok(recipient) => factory.fee_recipient = address_key(&recipient),
            Err(e) => warn!("[factory] fee recipient unavailable, using {}: {:#}", ZERO_ADDRESS, e),
        }
        match self.factory_reads.flash_loan_fee().await {
            Ok(fee) => factory.flash_loan_fee = u256_to_big_decimal(fee),
            Err(e) => warn!("[factory] flash loan fee unavailable, using 0: {:#}", e),
        }

        info!("[factory] created, fee_recipient={}", factory.fee_recipient);
        Ok(factory)
    }

    /// Record a user on first sight, counting them on the factory.
    pub(crate) async fn touch_user(
        &self,
        address: &Address,
        block_number: u64,
        factory: &mut Factory,
    ) -> anyhow::Result<()> {
        let id = address_key(address);
        let (user, created) = db::load_or_create(self.store(), &id, || User {
            id: id.clone(),
            first_seen_block: block_number,
        })
        .await?;

        if created {
            save(self.store(), &user).await?;
            factory.user_count += 1;
        }
        Ok(())
    }

    // ============================================
    // Per-bin ledger
    // ============================================

    /// Load a bin, pricing it from the pair's bin step and token decimals
    /// when it is first referenced.
    pub(crate) async fn load_bin(&self, pair: &Pair, bin_id: u32) -> anyhow::Result<Bin> {
        let key = Bin::key(&pair.id, bin_id);
        if let Some(bin) = load::<Bin, _>(self.store(), &key).await? {
            return Ok(bin);
        }

        let token_x = self.load_token(&pair.token_x).await?;
        let token_y = self.load_token(&pair.token_y).await?;
        let (price_x, price_y) = price_of_bin(
            bin_id,
            pair.bin_step,
            token_x.decimals,
            token_y.decimals,
            self.price_precision,
        );

        Ok(Bin::new(&pair.id, bin_id, price_x, price_y))
    }

    /// Apply raw flow and supply deltas to a bin and persist it.
    ///
    /// No clamping happens here: bin reserves are a plain delta log and may
    /// go negative if the stream is incomplete.
    pub(crate) async fn track_bin(&self, pair: &Pair, bin_id: u32, delta: BinDelta) -> anyhow::Result<Bin> {
        let mut bin = self.load_bin(pair, bin_id).await?;

        bin.total_supply = &bin.total_supply + &delta.minted - &delta.burned;
        bin.reserve_x = &bin.reserve_x + &delta.x_in - &delta.x_out;
        bin.reserve_y = &bin.reserve_y + &delta.y_in - &delta.y_out;

        save(self.store(), &bin).await?;
        Ok(bin)
    }

    // ============================================
    // Pair TVL
    // ============================================

    /// Recompute pair TVL from its current reserves and derived prices.
    pub(crate) fn recompute_tvl(&self, pair: &mut Pair, market: &Market) {
        let value_x = self.math.multiply(&pair.reserve_x, &market.token_x.derived_native);
        let value_y = self.math.multiply(&pair.reserve_y, &market.token_y.derived_native);

        let tvl_native = self
            .math
            .validate_reserve(value_x + value_y, &format!("pair {} totalValueLockedNative", pair.id));
        let tvl_usd = self.math.validate_reserve(
            self.math.multiply(&tvl_native, market.native_price_usd()),
            &format!("pair {} totalValueLockedUSD", pair.id),
        );

        pair.total_value_locked_native = tvl_native;
        pair.total_value_locked_usd = tvl_usd;
    }

    /// Add a pair's freshly computed TVL back onto the factory totals, after
    /// its previous contribution was subtracted.
    pub(crate) fn add_factory_tvl(&self, factory: &mut Factory, pair: &Pair, market: &Market) {
        let native = &factory.total_value_locked_native + &pair.total_value_locked_native;
        factory.total_value_locked_native =
            self.math.validate_reserve(native, "factory totalValueLockedNative");
        factory.total_value_locked_usd = self.math.validate_reserve(
            self.math
                .multiply(&factory.total_value_locked_native, market.native_price_usd()),
            "factory totalValueLockedUSD",
        );
    }
}
