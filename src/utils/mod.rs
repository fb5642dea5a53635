//! Utility functions for the rewards tool.
//!
//! This module is organized into focused submodules:
//!
//! - [`conversion`] - Reward normalisation (÷ 1e18, six digit truncation) and hex encoding
//! - [`pool_id`] - bytes32 pool id parsing and formatting

mod conversion;
mod pool_id;

// ============================================
// Re-exports
// ============================================

// Conversion utilities
pub use conversion::{
    hex_encode, normalize_reward, scale_down, DISPLAY_DECIMALS, NOT_AVAILABLE, REWARD_DECIMALS,
};

// Pool ID utilities
pub use pool_id::{format_pool_id, parse_pool_id};
