//! Numeric helpers for the accounting engine.
//!
//! - [`packed`] - Splitting a 256-bit event field into its two 128-bit amounts
//! - [`safe_math`] - Guarded multiply/divide and reserve validation
//! - [`bin_price`] - Price of a bin from its id and bin step
//! - [`conversion`] - Raw integer to decimal conversions and hex encoding

mod bin_price;
mod conversion;
mod packed;
mod safe_math;

// ============================================
// Common Constants
// ============================================

/// The Ethereum zero address (0x0000000000000000000000000000000000000000)
/// Used as the counterparty of LP share mints and burns.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

// ============================================
// Re-exports
// ============================================

pub use bin_price::{price_of_bin, BASIS_POINT_MAX, CENTER_BIN_ID};

pub use conversion::{address_key, format_token_amount, hex_encode, u256_to_big_decimal};

pub use packed::{decode_amounts, decode_amounts_byte_reversed, PackedEncoding};

pub use safe_math::{safe_div, SafeMath};
