//! Reward value normalisation and formatting utilities.
//!
//! Contract results arrive as decimal integer strings in wei-like units
//! (18 decimals). These helpers scale them down with exact decimal arithmetic
//! and render a short human-readable string.

use alloy::primitives::hex;
use bigdecimal::BigDecimal;
use log::debug;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use once_cell::sync::Lazy;
use std::str::FromStr;

use crate::error::{Result, RewardsError};

// ============================================
// Constants
// ============================================

/// Decimals of the reward token returned by `computeRewards`.
pub const REWARD_DECIMALS: u8 = 18;

/// Maximum number of fractional digits kept in a formatted value.
pub const DISPLAY_DECIMALS: u32 = 6;

/// Sentinel written when a result cannot be interpreted as a number.
pub const NOT_AVAILABLE: &str = "N/A";

/// Inputs whose decimal exponent exceeds this bound are treated as non-numeric.
const MAX_ABS_SCALE: i64 = 1_000;

// ============================================
// Hex Encoding
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// ============================================
// Reward Normalisation
// ============================================

/// Normalise a raw contract result into a human-scaled decimal string.
///
/// Thousands separators are stripped, the value is divided by 10^18 and the
/// fractional part is truncated (never rounded) to six digits. Anything that
/// is not a finite number yields [`NOT_AVAILABLE`].
///
/// # Example
/// ```ignore
/// assert_eq!(normalize_reward("1234567890123456789"), "1.234567");
/// assert_eq!(normalize_reward("abc"), "N/A");
/// ```
pub fn normalize_reward(raw: &str) -> String {
    match scale_down(raw, REWARD_DECIMALS, DISPLAY_DECIMALS) {
        Ok(value) => value,
        Err(e) => {
            debug!("Could not format result as number divided by 1e18: {}", e);
            NOT_AVAILABLE.to_string()
        }
    }
}

/// Divide a numeric string by 10^`decimals` and truncate to `max_fraction` digits.
///
/// # Arguments
/// * `raw` - Integer or decimal string, commas allowed as separators
/// * `decimals` - Power of ten to divide by
/// * `max_fraction` - Maximum fractional digits kept (truncated toward zero)
///
/// # Returns
/// * Plain decimal string without exponent or trailing zeros, or
///   [`RewardsError::Format`] if `raw` is not a finite number
pub fn scale_down(raw: &str, decimals: u8, max_fraction: u32) -> Result<String> {
    let stripped: String = raw.chars().filter(|c| *c != ',').collect();
    let trimmed = stripped.trim();

    let value =
        BigDecimal::from_str(trimmed).map_err(|_| RewardsError::Format(raw.to_string()))?;

    let (digits, scale) = value.into_bigint_and_exponent();
    if scale.abs() > MAX_ABS_SCALE {
        return Err(RewardsError::Format(raw.to_string()));
    }

    Ok(render_truncated(digits, scale + decimals as i64, max_fraction))
}

/// Render `digits * 10^-scale` as a plain decimal string with at most
/// `max_fraction` fractional digits.
fn render_truncated(digits: BigInt, scale: i64, max_fraction: u32) -> String {
    let max_fraction = max_fraction as i64;

    // BigInt division truncates toward zero, for negative values too
    let (digits, scale) = if scale > max_fraction {
        (digits / pow10((scale - max_fraction) as u32), max_fraction)
    } else {
        (digits, scale)
    };

    if digits.is_zero() {
        return "0".to_string();
    }

    let negative = digits.sign() == Sign::Minus;
    let mut magnitude = digits.magnitude().to_string();

    let (integer, fraction) = if scale <= 0 {
        magnitude.push_str(&"0".repeat((-scale) as usize));
        (magnitude, String::new())
    } else {
        let scale = scale as usize;
        if magnitude.len() <= scale {
            magnitude = format!("{}{}", "0".repeat(scale + 1 - magnitude.len()), magnitude);
        }
        let split = magnitude.len() - scale;
        let fraction = magnitude[split..].trim_end_matches('0').to_string();
        magnitude.truncate(split);
        (magnitude, fraction)
    };

    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigInt; 40]> =
    Lazy::new(|| std::array::from_fn(|i| BigInt::from(10u32).pow(i as u32)));

/// Compute 10^exp as BigInt.
pub(crate) fn pow10(exp: u32) -> BigInt {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigInt::from(10u32).pow(exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_token() {
        assert_eq!(normalize_reward("1000000000000000000"), "1");
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        assert_eq!(normalize_reward("1234567890123456789"), "1.234567");
        // 1.2345678 -> 1.234567 (rounding would give 1.234568)
        assert_eq!(normalize_reward("1234567800000000000"), "1.234567");
        assert_eq!(normalize_reward("999999999999999999"), "0.999999");
    }

    #[test]
    fn test_non_numeric_is_not_available() {
        assert_eq!(normalize_reward("abc"), NOT_AVAILABLE);
        assert_eq!(normalize_reward(""), NOT_AVAILABLE);
        assert_eq!(normalize_reward("12, 34"), NOT_AVAILABLE);
        assert_eq!(normalize_reward("1, 2"), NOT_AVAILABLE);
        assert_eq!(normalize_reward("NaN"), NOT_AVAILABLE);
        assert_eq!(normalize_reward("1e99999"), NOT_AVAILABLE);
        // hex is not a decimal number
        assert_eq!(normalize_reward("0x10"), NOT_AVAILABLE);
    }

    #[test]
    fn test_zero() {
        assert_eq!(normalize_reward("0"), "0");
        assert_eq!(normalize_reward("-0"), "0");
    }

    #[test]
    fn test_no_trailing_zero_padding() {
        assert_eq!(normalize_reward("1500000000000000000"), "1.5");
        assert_eq!(normalize_reward("25000000000000000000"), "25");
        assert_eq!(normalize_reward("100000000000000000000000"), "100000");
    }

    #[test]
    fn test_small_values() {
        assert_eq!(normalize_reward("1000000000000"), "0.000001");
        // Below the display precision truncates to zero
        assert_eq!(normalize_reward("999999999999"), "0");
    }

    #[test]
    fn test_commas_are_ignored() {
        let pairs = [
            ("1,000,000,000,000,000,000", "1000000000000000000"),
            ("1,234,567,890,123,456,789", "1234567890123456789"),
            ("12,345", "12345"),
            ("-5,000,000,000,000,000,001", "-5000000000000000001"),
        ];
        for (with_commas, plain) in pairs {
            assert_eq!(normalize_reward(with_commas), normalize_reward(plain));
        }
    }

    #[test]
    fn test_negative_truncates_toward_zero() {
        assert_eq!(normalize_reward("-1234567890123456789"), "-1.234567");
        assert_eq!(normalize_reward("-1"), "0");
    }

    #[test]
    fn test_exact_above_f64_precision() {
        // 2^64 + 1 wei, well past the safe-integer range of f64
        assert_eq!(normalize_reward("18446744073709551617"), "18.446744");
        assert_eq!(
            normalize_reward("123456789012345678901234567890123456789"),
            "123456789012345678901.234567"
        );
    }

    #[test]
    fn test_scale_down_custom_decimals() {
        assert_eq!(scale_down("1234567", 6, 2).unwrap(), "1.23");
        assert_eq!(scale_down("1.5e3", 0, 6).unwrap(), "1500");
        assert!(matches!(scale_down("x", 6, 2), Err(RewardsError::Format(_))));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0xab, 0x01]), "0xab01");
    }
}
