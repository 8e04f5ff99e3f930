use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::safe_math::safe_div;

/// Bin id whose raw price is exactly 1 (2^23).
pub const CENTER_BIN_ID: u32 = 8_388_608;

/// Bin steps are expressed in basis points.
pub const BASIS_POINT_MAX: u32 = 10_000;

/// Price of token X in units of token Y for a bin:
/// `(1 + binStep / 10_000) ^ (binId - CENTER) * 10^decimalsX / 10^decimalsY`.
///
/// The power is taken one step at a time, multiplying above the center bin
/// and dividing below it, rounding each intermediate to `precision`
/// significant digits. Stepping keeps the result identical to the on-chain
/// bin price regardless of how far the bin sits from the center.
///
/// Returns `(price_x, price_y)` where `price_x = 1 / price_y`.
pub fn price_of_bin(
    bin_id: u32,
    bin_step: u16,
    decimals_x: u8,
    decimals_y: u8,
    precision: u64,
) -> (BigDecimal, BigDecimal) {
    // 1 + binStep / 10_000, exact at scale 4
    let base = BigDecimal::new(BigInt::from(BASIS_POINT_MAX + u32::from(bin_step)), 4);
    let distance = i64::from(bin_id) - i64::from(CENTER_BIN_ID);

    let mut raw = BigDecimal::from(1);
    for _ in 0..distance.unsigned_abs() {
        raw = if distance > 0 { &raw * &base } else { &raw / &base };
        raw = raw.with_prec(precision);
    }

    // Scale by 10^decimalsX / 10^decimalsY by moving the decimal point
    let scale = i64::from(decimals_y) - i64::from(decimals_x);
    let price_y = (raw * BigDecimal::new(BigInt::from(1), scale)).with_prec(precision);
    let price_x = safe_div(&BigDecimal::from(1), &price_y).with_prec(precision);

    (price_x, price_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const PRECISION: u64 = 34;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn assert_close(actual: &BigDecimal, expected: &BigDecimal, tolerance: &str) {
        let diff = (actual - expected).abs();
        assert!(diff < dec(tolerance), "{} is not within {} of {}", actual, tolerance, expected);
    }

    #[test]
    fn test_center_bin_is_one() {
        let (price_x, price_y) = price_of_bin(CENTER_BIN_ID, 25, 18, 18, PRECISION);
        assert_eq!(price_y, dec("1"));
        assert_eq!(price_x, dec("1"));
    }

    #[test]
    fn test_adjacent_bins() {
        let (_, above) = price_of_bin(CENTER_BIN_ID + 1, 25, 18, 18, PRECISION);
        assert_eq!(above, dec("1.0025"));

        let (_, two_above) = price_of_bin(CENTER_BIN_ID + 2, 25, 18, 18, PRECISION);
        assert_eq!(two_above, dec("1.00500625"));

        let (price_x, below) = price_of_bin(CENTER_BIN_ID - 1, 25, 18, 18, PRECISION);
        assert_close(&below, &dec("0.997506234413965087281795511221945137"), "1e-30");
        assert_close(&price_x, &dec("1.0025"), "1e-30");
    }

    #[test]
    fn test_decimal_scaling() {
        // X has 18 decimals, Y has 6: one raw unit of X is worth 1e12 raw units less of Y
        let (_, price_y) = price_of_bin(CENTER_BIN_ID, 1, 18, 6, PRECISION);
        assert_eq!(price_y, dec("1e12"));

        let (price_x, price_y) = price_of_bin(CENTER_BIN_ID, 1, 6, 18, PRECISION);
        assert_eq!(price_y, dec("1e-12"));
        assert_eq!(price_x, dec("1e12"));
    }

    #[test]
    fn test_inverse_law() {
        let cases = [
            (CENTER_BIN_ID + 1_000, 25u16),
            (CENTER_BIN_ID - 1_000, 25),
            (CENTER_BIN_ID + 137, 100),
            (CENTER_BIN_ID - 2_500, 1),
            (CENTER_BIN_ID + 50, 250),
        ];
        for (bin_id, bin_step) in cases {
            let (price_x, price_y) = price_of_bin(bin_id, bin_step, 18, 18, PRECISION);
            assert_close(&(price_x * price_y), &dec("1"), "1e-25");
        }
    }
}
