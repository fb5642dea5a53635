//! Contract-call collaborators.
//!
//! The batch logic only sees the [`RewardsSource`] and [`FunctionCall`]
//! traits; [`rpc`] provides the JSON-RPC backed implementations.

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::Function;
use alloy::primitives::{B256, U256};
use async_trait::async_trait;

use crate::error::Result;

pub mod rpc;

pub use rpc::{connect_http, FunctionCaller, RewardsContract, SelectedFunction};

/// Anything that can answer "rewards of pool X for epoch N".
///
/// The returned string is the result's display form (decimal integer for
/// `uint256` results); it becomes the `rawResult` of a query.
#[async_trait]
pub trait RewardsSource: Send + Sync {
    async fn compute_rewards(&self, pool_id: B256, epoch: U256) -> Result<String>;
}

/// Calls an arbitrary read-only function described by its ABI entry.
#[async_trait]
pub trait FunctionCall: Send + Sync {
    /// Returns the decoded outputs rendered and joined with `", "`.
    async fn call_function(&self, function: &Function, args: &[DynSolValue]) -> Result<String>;
}
