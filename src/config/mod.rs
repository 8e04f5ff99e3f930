mod config;

pub use config::{
    ArithmeticSettings, DecodingSettings, EngineSettings, FixedTokenPrice, OracleSettings,
    PostgresSettings, PricingSettings, ReplaySettings, Settings,
};
