mod bin;
mod bundle;
mod checkpoint;
mod factory;
mod interval;
mod pair;
mod parameters;
mod position;
mod records;
mod token;

pub use bin::Bin;
pub use bundle::{Bundle, BUNDLE_ID};
pub use checkpoint::{Checkpoint, CHECKPOINT_ID};
pub use factory::{Factory, FACTORY_ID};
pub use interval::{
    FactoryIntervalData, PairIntervalData, Period, ProtocolFeeDayData, TokenIntervalData,
};
pub use pair::Pair;
pub use parameters::PairParameterSet;
pub use position::{LiquidityPosition, User};
pub use records::{Flash, Swap, Transfer};
pub use token::Token;
