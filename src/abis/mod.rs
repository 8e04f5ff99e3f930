pub mod dex_lens;
pub mod lb_factory;

pub use dex_lens::IDexLens;
pub use lb_factory::ILBFactory;
