//! Pool identifier utilities.
//!
//! Pool ids are bytes32 values passed as the first argument of the rewards
//! function. They are configured as `0x`-prefixed hex strings.

use alloy::primitives::B256;
use std::str::FromStr;

use crate::error::{Result, RewardsError};

/// Parse a `0x`-prefixed, 64 hex digit pool id (any letter case).
///
/// # Example
/// ```ignore
/// let id = parse_pool_id(
///     "0x02d1dc927ecebd87407e1a58a6f2d81f0d6c0ade72ac926e865310aa482b893a",
/// )?;
/// ```
pub fn parse_pool_id(value: &str) -> Result<B256> {
    let trimmed = value.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| RewardsError::invalid("bytes32", value))?;

    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RewardsError::invalid("bytes32", value));
    }

    B256::from_str(hex_part).map_err(|_| RewardsError::invalid("bytes32", value))
}

/// Render a pool id as lowercase hex with 0x prefix.
pub fn format_pool_id(id: &B256) -> String {
    format!("{id:#x}")
}
