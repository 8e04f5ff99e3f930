//! Guarded decimal arithmetic.
//!
//! On-chain inputs can be malformed or adversarial, and values derived from
//! them compound through several multiplications per event. Every guard here
//! saturates to zero and logs instead of failing, so one bad event degrades a
//! single aggregate rather than halting the pipeline.
//!
//! 1. MULTIPLY: operands or products above the multiply ceiling become zero.
//!
//! 2. DIVIDE: a zero divisor yields zero.
//!
//! 3. RESERVES: negative values and values above the reserve ceiling are
//!    clamped to zero before they are persisted.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use bigdecimal::BigDecimal;
use log::warn;
use num_traits::Zero;

use crate::config::ArithmeticSettings;

// ============================================
// Default Ceilings
// ============================================

/// Largest operand or product `multiply` lets through (1e20).
pub const DEFAULT_MULTIPLY_CEILING_EXP: i64 = 20;

/// Largest reserve or TVL value `validate_reserve` lets through (1e15).
pub const DEFAULT_RESERVE_CEILING_EXP: i64 = 15;

/// Guarded arithmetic with configured ceilings.
///
/// Counts how many times a guard fired so reconciliation jobs (and tests)
/// can tell a clean run from a degraded one.
#[derive(Debug)]
pub struct SafeMath {
    multiply_ceiling: BigDecimal,
    reserve_ceiling: BigDecimal,
    guard_firings: AtomicU64,
}

impl Default for SafeMath {
    fn default() -> Self {
        Self::new(
            BigDecimal::new(1.into(), -DEFAULT_MULTIPLY_CEILING_EXP),
            BigDecimal::new(1.into(), -DEFAULT_RESERVE_CEILING_EXP),
        )
    }
}

impl SafeMath {
    pub fn new(multiply_ceiling: BigDecimal, reserve_ceiling: BigDecimal) -> Self {
        Self {
            multiply_ceiling,
            reserve_ceiling,
            guard_firings: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &ArithmeticSettings) -> anyhow::Result<Self> {
        let multiply_ceiling = BigDecimal::from_str(&settings.multiply_ceiling)
            .with_context(|| format!("Invalid multiply_ceiling: {}", settings.multiply_ceiling))?;
        let reserve_ceiling = BigDecimal::from_str(&settings.reserve_ceiling)
            .with_context(|| format!("Invalid reserve_ceiling: {}", settings.reserve_ceiling))?;

        Ok(Self::new(multiply_ceiling, reserve_ceiling))
    }

    /// Number of times any guard clamped a value since construction.
    pub fn guard_firings(&self) -> u64 {
        self.guard_firings.load(Ordering::Relaxed)
    }

    /// Multiply two decimals, returning zero when either operand is zero or
    /// when an operand or the product exceeds the multiply ceiling.
    pub fn multiply(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        if a.is_zero() || b.is_zero() {
            return BigDecimal::zero();
        }

        if a.abs() > self.multiply_ceiling || b.abs() > self.multiply_ceiling {
            self.fire();
            warn!(
                "[safe_multiply] operand above ceiling, returning 0: a={} b={} ceiling={}",
                a, b, self.multiply_ceiling
            );
            return BigDecimal::zero();
        }

        let product = a * b;
        if product.abs() > self.multiply_ceiling {
            self.fire();
            warn!(
                "[safe_multiply] product above ceiling, returning 0: a={} b={} product={} ceiling={}",
                a, b, product, self.multiply_ceiling
            );
            return BigDecimal::zero();
        }

        product
    }

    /// Clamp a computed reserve or TVL value into `[0, reserve_ceiling]`.
    ///
    /// Out-of-range values become zero, not the nearest bound.
    pub fn validate_reserve(&self, value: BigDecimal, label: &str) -> BigDecimal {
        if value < BigDecimal::zero() {
            self.fire();
            warn!("[validate_reserve] negative value clamped to 0: {}={}", label, value);
            return BigDecimal::zero();
        }

        if value > self.reserve_ceiling {
            self.fire();
            warn!(
                "[validate_reserve] value above ceiling clamped to 0: {}={} ceiling={}",
                label, value, self.reserve_ceiling
            );
            return BigDecimal::zero();
        }

        value
    }

    #[inline]
    fn fire(&self) {
        self.guard_firings.fetch_add(1, Ordering::Relaxed);
    }
}

/// Divide, returning zero when the divisor is zero.
#[inline]
pub fn safe_div(amount: &BigDecimal, divisor: &BigDecimal) -> BigDecimal {
    if divisor.is_zero() {
        return BigDecimal::zero();
    }
    amount / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_multiply_zero_operand() {
        let math = SafeMath::default();
        assert_eq!(math.multiply(&BigDecimal::zero(), &dec("12345")), BigDecimal::zero());
        assert_eq!(math.multiply(&dec("12345"), &BigDecimal::zero()), BigDecimal::zero());
        assert_eq!(math.guard_firings(), 0);
    }

    #[test]
    fn test_multiply_within_ceiling() {
        let math = SafeMath::default();
        assert_eq!(math.multiply(&dec("1.5"), &dec("2")), dec("3"));
        assert_eq!(math.multiply(&dec("-2"), &dec("4")), dec("-8"));
    }

    #[test]
    fn test_multiply_above_ceiling_is_zero() {
        let math = SafeMath::default();
        assert_eq!(math.multiply(&dec("2e20"), &dec("1")), BigDecimal::zero());
        assert_eq!(math.multiply(&dec("1e11"), &dec("1e10")), BigDecimal::zero());
        assert_eq!(math.guard_firings(), 2);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(&dec("10"), &BigDecimal::zero()), BigDecimal::zero());
        assert_eq!(safe_div(&dec("10"), &dec("4")), dec("2.5"));
    }

    #[test]
    fn test_validate_reserve() {
        let math = SafeMath::default();
        assert_eq!(math.validate_reserve(dec("-5"), "reserveX"), BigDecimal::zero());
        assert_eq!(math.validate_reserve(dec("2e15"), "reserveX"), BigDecimal::zero());
        assert_eq!(math.validate_reserve(dec("100"), "reserveX"), dec("100"));
        assert_eq!(math.validate_reserve(dec("1e15"), "reserveX"), dec("1e15"));
        assert_eq!(math.guard_firings(), 2);
    }

    #[test]
    fn test_from_settings_parses_ceilings() {
        let math = SafeMath::from_settings(&ArithmeticSettings {
            multiply_ceiling: "1000".to_string(),
            reserve_ceiling: "10".to_string(),
        })
        .unwrap();
        assert_eq!(math.multiply(&dec("100"), &dec("20")), BigDecimal::zero());
        assert_eq!(math.validate_reserve(dec("11"), "tvl"), BigDecimal::zero());

        assert!(SafeMath::from_settings(&ArithmeticSettings {
            multiply_ceiling: "lots".to_string(),
            reserve_ceiling: "10".to_string(),
        })
        .is_err());
    }
}
