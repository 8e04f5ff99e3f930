pub mod engine;
pub mod events;
mod handlers;
pub mod pricing;
pub mod replay;
mod rollups;

pub use engine::{BinDelta, Engine, Outcome};
pub use events::{DecodeError, EventMeta, LogEvent, PairEvent};
pub use pricing::{FactoryReader, FixedPriceOracle, Market, OnChainOracle, PriceOracle};
pub use replay::{ReplayStats, Replayer};
