#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use bigdecimal::BigDecimal;

use binbook::config::EngineSettings;
use binbook::db::models::{Bin, Pair, Token};
use binbook::db::{load, Entity};
use binbook::utils::{address_key, CENTER_BIN_ID};
use binbook::worker::events::{
    BinLiquidity, CollectedProtocolFees, CompositionFees, FlashLoan, PairCreated, StaticFeeParametersSet,
    Swap, TokenMetadata, TransferBatch,
};
use binbook::worker::{EventMeta, LogEvent, PairEvent};
use binbook::{Engine, FixedPriceOracle, MemoryStore, Outcome, Store};

pub const PAIR: Address = Address::new([0x33; 20]);
pub const TOKEN_X: Address = Address::new([0x11; 20]);
pub const TOKEN_Y: Address = Address::new([0x22; 20]);
pub const USER: Address = Address::new([0x44; 20]);
pub const OTHER_USER: Address = Address::new([0x55; 20]);

/// 2023-11-14T22:13:20Z
pub const T0: u64 = 1_700_000_000;

pub const ONE: u128 = 1_000_000_000_000_000_000;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn pack(x: u128, y: u128) -> B256 {
    let value = (U256::from(y) << 128usize) | U256::from(x);
    B256::from(value.to_be_bytes::<32>())
}

pub fn pack_reversed(x: u128, y: u128) -> B256 {
    let mut bytes = pack(x, y).0;
    bytes.reverse();
    B256::from(bytes)
}

/// Native price 2 USD, both tokens worth 1 native.
pub fn default_oracle() -> FixedPriceOracle {
    FixedPriceOracle::new(BigDecimal::from(2))
        .with_token_price(TOKEN_X, BigDecimal::from(1))
        .with_token_price(TOKEN_Y, BigDecimal::from(1))
}

pub fn engine_for(store: &Arc<MemoryStore>, oracle: FixedPriceOracle) -> Engine {
    let oracle = Arc::new(oracle);
    Engine::new(
        store.clone() as Arc<dyn Store>,
        oracle.clone(),
        oracle,
        &EngineSettings::default(),
    )
    .unwrap()
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub engine: Engine,
    block: u64,
    log_index: u64,
    pub timestamp: u64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_oracle(default_oracle())
    }

    pub fn with_oracle(oracle: FixedPriceOracle) -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_for(&store, oracle);

        Self {
            store,
            engine,
            block: 100,
            log_index: 0,
            timestamp: T0,
        }
    }

    pub fn into_parts(self) -> (Arc<MemoryStore>, Engine) {
        (self.store, self.engine)
    }

    /// Metadata for the next event, one log per block.
    pub fn next_meta(&mut self) -> EventMeta {
        self.block += 1;
        self.log_index += 1;
        EventMeta {
            pair: PAIR,
            block_number: self.block,
            block_timestamp: self.timestamp,
            tx_hash: B256::with_last_byte(self.block as u8),
            log_index: self.log_index,
            origin: USER,
        }
    }

    pub fn event(&mut self, event: PairEvent) -> LogEvent {
        LogEvent {
            meta: self.next_meta(),
            event,
        }
    }

    pub async fn apply(&mut self, event: PairEvent) -> anyhow::Result<Outcome> {
        let event = self.event(event);
        self.engine.handle(&event).await
    }

    pub async fn create_pair(&mut self) {
        let outcome = self.apply(pair_created()).await.unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    pub async fn get<E: Entity>(&self, id: &str) -> E {
        load::<E, _>(self.store.as_ref(), id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("{} {} not found", E::KIND, id))
    }

    pub async fn find<E: Entity>(&self, id: &str) -> Option<E> {
        load::<E, _>(self.store.as_ref(), id).await.unwrap()
    }

    pub async fn pair(&self) -> Pair {
        self.get(&address_key(&PAIR)).await
    }

    pub async fn token_x(&self) -> Token {
        self.get(&address_key(&TOKEN_X)).await
    }

    pub async fn token_y(&self) -> Token {
        self.get(&address_key(&TOKEN_Y)).await
    }

    pub async fn bin(&self, bin_id: u32) -> Bin {
        self.get(&Bin::key(&address_key(&PAIR), bin_id)).await
    }
}

pub fn pair_created() -> PairEvent {
    PairEvent::PairCreated(PairCreated {
        token_x: TokenMetadata {
            address: TOKEN_X,
            symbol: "TKX".to_string(),
            name: "Token X".to_string(),
            decimals: 18,
        },
        token_y: TokenMetadata {
            address: TOKEN_Y,
            symbol: "TKY".to_string(),
            name: "Token Y".to_string(),
            decimals: 18,
        },
        bin_step: 25,
        active_id: CENTER_BIN_ID,
    })
}

pub fn deposit(bins: &[(u32, u128, u128)]) -> PairEvent {
    PairEvent::DepositedToBins(bin_liquidity(bins))
}

pub fn withdraw(bins: &[(u32, u128, u128)]) -> PairEvent {
    PairEvent::WithdrawnFromBins(bin_liquidity(bins))
}

fn bin_liquidity(bins: &[(u32, u128, u128)]) -> BinLiquidity {
    BinLiquidity {
        sender: USER,
        to: USER,
        ids: bins.iter().map(|(id, _, _)| U256::from(*id)).collect(),
        amounts: bins.iter().map(|(_, x, y)| pack(*x, *y)).collect(),
    }
}

/// Swap at `bin_id`; fees are packed byte-reversed.
pub fn swap(bin_id: u32, amounts_in: (u128, u128), amounts_out: (u128, u128), fees: (u128, u128)) -> PairEvent {
    PairEvent::Swap(Swap {
        sender: USER,
        to: USER,
        id: bin_id,
        amounts_in: pack(amounts_in.0, amounts_in.1),
        amounts_out: pack(amounts_out.0, amounts_out.1),
        volatility_accumulator: 0,
        total_fees: pack_reversed(fees.0, fees.1),
        protocol_fees: B256::ZERO,
        swap_for_y: None,
    })
}

pub fn flash_loan(amounts: (u128, u128), fees: (u128, u128)) -> PairEvent {
    PairEvent::FlashLoan(FlashLoan {
        sender: USER,
        receiver: OTHER_USER,
        active_id: CENTER_BIN_ID,
        amounts: pack(amounts.0, amounts.1),
        total_fees: pack_reversed(fees.0, fees.1),
        protocol_fees: B256::ZERO,
    })
}

pub fn composition_fees(fees: (u128, u128)) -> PairEvent {
    PairEvent::CompositionFees(CompositionFees {
        sender: USER,
        id: CENTER_BIN_ID,
        total_fees: pack_reversed(fees.0, fees.1),
        protocol_fees: B256::ZERO,
    })
}

pub fn protocol_fees(fees: (u128, u128)) -> PairEvent {
    PairEvent::CollectedProtocolFees(CollectedProtocolFees {
        fee_recipient: OTHER_USER,
        protocol_fees: pack_reversed(fees.0, fees.1),
    })
}

pub fn transfer(from: Address, to: Address, shares: &[(u32, u128)]) -> PairEvent {
    PairEvent::TransferBatch(TransferBatch {
        sender: USER,
        from,
        to,
        ids: shares.iter().map(|(id, _)| U256::from(*id)).collect(),
        amounts: shares.iter().map(|(_, amount)| U256::from(*amount)).collect(),
    })
}

pub fn static_fee_parameters(protocol_share: u16) -> PairEvent {
    PairEvent::StaticFeeParametersSet(StaticFeeParametersSet {
        sender: USER,
        base_factor: 5_000,
        filter_period: 30,
        decay_period: 600,
        reduction_factor: 5_000,
        variable_fee_control: 40_000,
        protocol_share,
        max_volatility_accumulator: 350_000,
    })
}
