pub mod abis;
pub mod config;
pub mod db;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use db::{MemoryStore, PostgresStore, Store};
pub use worker::{Engine, FixedPriceOracle, LogEvent, OnChainOracle, Outcome, Replayer};
