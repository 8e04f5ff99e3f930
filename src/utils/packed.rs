//! Decoding of two 128-bit amounts packed into one 256-bit event field.
//!
//! Liquidity book events pack an `(x, y)` pair into a single `bytes32`:
//! the low 128 bits hold X and the high 128 bits hold Y. Some fields are
//! emitted with the byte sequence reversed, so callers pick the variant per
//! field through [`PackedEncoding`].

use alloy::primitives::{B256, U256};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static LOW_128_MASK: Lazy<U256> = Lazy::new(|| (U256::from(1u8) << 128usize) - U256::from(1u8));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackedEncoding {
    Standard,
    ByteReversed,
}

impl PackedEncoding {
    pub fn decode(self, packed: &B256) -> (u128, u128) {
        match self {
            PackedEncoding::Standard => decode_amounts(packed),
            PackedEncoding::ByteReversed => decode_amounts_byte_reversed(packed),
        }
    }
}

/// Split a packed field into `(x, y)`.
pub fn decode_amounts(packed: &B256) -> (u128, u128) {
    split(U256::from_be_bytes(packed.0))
}

/// Split a packed field whose byte sequence was emitted in reverse order.
pub fn decode_amounts_byte_reversed(packed: &B256) -> (u128, u128) {
    let mut bytes = packed.0;
    bytes.reverse();
    split(U256::from_be_bytes(bytes))
}

#[inline]
fn split(value: U256) -> (u128, u128) {
    // Both halves fit in 128 bits after masking/shifting
    let x = (value & *LOW_128_MASK).to::<u128>();
    let y = (value >> 128usize).to::<u128>();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(x: u128, y: u128) -> B256 {
        let value = (U256::from(y) << 128usize) | U256::from(x);
        B256::from(value.to_be_bytes::<32>())
    }

    fn pack_reversed(x: u128, y: u128) -> B256 {
        let mut bytes = pack(x, y).0;
        bytes.reverse();
        B256::from(bytes)
    }

    #[test]
    fn test_zero_decodes_to_zero() {
        assert_eq!(decode_amounts(&B256::ZERO), (0, 0));
        assert_eq!(decode_amounts_byte_reversed(&B256::ZERO), (0, 0));
    }

    #[test]
    fn test_low_bits_are_x_high_bits_are_y() {
        let packed = pack(10_000_000_000_000_000_000, 9_970_000_000_000_000_000);
        assert_eq!(
            decode_amounts(&packed),
            (10_000_000_000_000_000_000, 9_970_000_000_000_000_000)
        );
    }

    #[test]
    fn test_halves_do_not_bleed() {
        assert_eq!(decode_amounts(&pack(u128::MAX, 0)), (u128::MAX, 0));
        assert_eq!(decode_amounts(&pack(0, u128::MAX)), (0, u128::MAX));
        assert_eq!(decode_amounts(&pack(u128::MAX, 1)), (u128::MAX, 1));
        assert_eq!(decode_amounts(&pack(1, u128::MAX)), (1, u128::MAX));
    }

    #[test]
    fn test_byte_reversed_variant() {
        let cases = [(0u128, 0u128), (1, 2), (u128::MAX, 7), (30_000_000_000_000_000, 0)];
        for (x, y) in cases {
            assert_eq!(decode_amounts_byte_reversed(&pack_reversed(x, y)), (x, y));
            assert_eq!(PackedEncoding::ByteReversed.decode(&pack_reversed(x, y)), (x, y));
            assert_eq!(PackedEncoding::Standard.decode(&pack(x, y)), (x, y));
        }
    }

    #[test]
    fn test_wrong_variant_swaps_byte_order() {
        // 1 in the lowest byte reads as 1 << 120 in the high half when reversed
        let packed = pack(1, 0);
        assert_eq!(decode_amounts_byte_reversed(&packed), (0, 1u128 << 120));
    }
}
