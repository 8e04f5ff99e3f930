pub mod client;
pub mod ops;

pub use client::PostgresStore;
