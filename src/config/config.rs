use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::utils::PackedEncoding;

/// PostgreSQL connection configuration.
///
/// When present, every entity is persisted to the `binbook.entities` table.
/// When absent the replay harness keeps state in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    4
}

/// On-chain read configuration for the price oracle and factory reads.
///
/// With an `rpc_url` the DEX lens contract is queried for every refresh.
/// Without one, the fixed prices below are served instead.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OracleSettings {
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// DEX lens contract exposing `getTokenPriceUSD` / `getTokenPriceNative`
    #[serde(default)]
    pub dex_lens_address: Option<String>,
    /// Wrapped native token whose USD price feeds the bundle
    #[serde(default)]
    pub wrapped_native_address: Option<String>,
    /// LB factory queried for fee recipient and flash loan fee
    #[serde(default)]
    pub factory_address: Option<String>,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    // Fixed fallback pricing (used when rpc_url is absent)
    #[serde(default)]
    pub native_price_usd: Option<String>,
    #[serde(default)]
    pub token_prices_native: Vec<FixedTokenPrice>,
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct FixedTokenPrice {
    pub address: String,
    pub price_native: String,
}

/// Guard ceilings for the safe decimal arithmetic.
///
/// Values are decimal strings so they survive parsing without float rounding.
#[derive(Debug, Deserialize, Clone)]
pub struct ArithmeticSettings {
    /// Operands or products above this magnitude multiply to zero
    #[serde(default = "default_multiply_ceiling")]
    pub multiply_ceiling: String,
    /// Reserves and TVL above this value are clamped to zero
    #[serde(default = "default_reserve_ceiling")]
    pub reserve_ceiling: String,
}

fn default_multiply_ceiling() -> String {
    "1e20".to_string()
}

fn default_reserve_ceiling() -> String {
    "1e15".to_string()
}

impl Default for ArithmeticSettings {
    fn default() -> Self {
        Self {
            multiply_ceiling: default_multiply_ceiling(),
            reserve_ceiling: default_reserve_ceiling(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    /// Significant digits kept after each bin price step
    #[serde(default = "default_price_precision")]
    pub price_precision: u64,
}

fn default_price_precision() -> u64 {
    34
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            price_precision: default_price_precision(),
        }
    }
}

/// Byte order of the packed 256-bit event fields.
///
/// Amount fields and fee fields are configured independently because the
/// emitting contracts do not agree on a single layout.
#[derive(Debug, Deserialize, Clone)]
pub struct DecodingSettings {
    #[serde(default = "default_amounts_encoding")]
    pub amounts: PackedEncoding,
    #[serde(default = "default_fees_encoding")]
    pub fees: PackedEncoding,
}

fn default_amounts_encoding() -> PackedEncoding {
    PackedEncoding::Standard
}

fn default_fees_encoding() -> PackedEncoding {
    PackedEncoding::ByteReversed
}

impl Default for DecodingSettings {
    fn default() -> Self {
        Self {
            amounts: default_amounts_encoding(),
            fees: default_fees_encoding(),
        }
    }
}

/// Everything the accounting engine needs besides its collaborators.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EngineSettings {
    #[serde(default)]
    pub arithmetic: ArithmeticSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub decoding: DecodingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySettings {
    /// Newline-delimited JSON file of ordered pair events
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Stop at the first event that fails to apply
    #[serde(default = "default_halt_on_error")]
    pub halt_on_error: bool,
}

fn default_events_path() -> String {
    "events.ndjson".to_string()
}

fn default_halt_on_error() -> bool {
    true
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            halt_on_error: default_halt_on_error(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup, with `BINBOOK__SECTION__KEY`
/// environment variables taking precedence.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub postgres: Option<PostgresSettings>,
    #[serde(default)]
    pub replay: ReplaySettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("BINBOOK").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
