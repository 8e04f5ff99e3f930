//! Type conversion and formatting utilities.
//!
//! Raw on-chain integers are turned into exact decimals by moving the decimal
//! point, never by dividing, so no precision is lost on the way in.

use alloy::primitives::{hex, Address, U256};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};

// ============================================
// Hex Encoding
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Lowercase hex key used for every address-keyed entity.
pub fn address_key(address: &Address) -> String {
    hex_encode(address.as_slice())
}

// ============================================
// Decimal Conversions
// ============================================

/// Convert a raw token amount to its decimal-adjusted value.
///
/// ```ignore
/// let amount = format_token_amount(1_500_000_000_000_000_000u128, 18); // 1.5
/// ```
pub fn format_token_amount(raw: u128, decimals: u8) -> BigDecimal {
    BigDecimal::new(BigInt::from(raw), i64::from(decimals))
}

/// Convert U256 to an integral BigDecimal via bytes (faster than string parsing).
pub fn u256_to_big_decimal(value: U256) -> BigDecimal {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigDecimal::from(BigInt::from_bytes_le(Sign::Plus, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_token_amount_moves_decimal_point() {
        let amount = format_token_amount(1_500_000_000_000_000_000, 18);
        assert_eq!(amount, BigDecimal::from_str("1.5").unwrap());

        let usdc = format_token_amount(2_500_000, 6);
        assert_eq!(usdc, BigDecimal::from_str("2.5").unwrap());

        assert_eq!(format_token_amount(42, 0), BigDecimal::from(42));
    }

    #[test]
    fn test_u256_to_big_decimal_keeps_full_width() {
        let max = u256_to_big_decimal(U256::MAX);
        assert_eq!(
            max,
            BigDecimal::from_str(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
            .unwrap()
        );
    }

    #[test]
    fn test_address_key_is_lowercase() {
        let address = Address::from_str("0xAE13D989daC2f0dEbFf460aC112a837C89BAa7cd").unwrap();
        assert_eq!(address_key(&address), "0xae13d989dac2f0debff460ac112a837c89baa7cd");
    }
}
