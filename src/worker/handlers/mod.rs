//! One state transition per event kind, each an `Engine` method.
//!
//! Every handler loads its pair first (unknown pair: skip with no writes),
//! decodes all packed fields second (failure: error with no writes), and
//! only then mutates entities.

mod composition_fees;
mod flash_loan;
mod liquidity;
mod pair_created;
mod parameters;
mod protocol_fees;
mod swap;
mod transfer_batch;
