use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use log::debug;
use url::Url;

use super::{FunctionCall, RewardsSource};
use crate::abis::rewards::IRewardsDistributor::{self, IRewardsDistributorInstance};
use crate::abis::{is_pool_epoch_call, render_values, ParamKind};
use crate::error::{Result, RewardsError};

/// Build an HTTP JSON-RPC provider.
pub fn connect_http(rpc_url: &str) -> Result<DynProvider> {
    let url = Url::parse(rpc_url)
        .map_err(|e| RewardsError::Config(format!("invalid RPC URL {rpc_url:?}: {e}")))?;
    let client = ProviderBuilder::new().connect_http(url);
    Ok(DynProvider::new(client))
}

/// `computeRewards` through the compiled contract binding.
#[derive(Clone)]
pub struct RewardsContract {
    contract: IRewardsDistributorInstance<DynProvider>,
}

impl RewardsContract {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self {
            contract: IRewardsDistributor::new(address, provider),
        }
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }
}

#[async_trait]
impl RewardsSource for RewardsContract {
    async fn compute_rewards(&self, pool_id: B256, epoch: U256) -> Result<String> {
        let rewards = self
            .contract
            .computeRewards(pool_id, epoch)
            .call()
            .await
            .map_err(|e| RewardsError::Call(e.to_string()))?;
        Ok(rewards.to_string())
    }
}

/// ABI-driven `eth_call` against one contract.
#[derive(Clone)]
pub struct FunctionCaller {
    provider: DynProvider,
    address: Address,
}

impl FunctionCaller {
    pub fn new(provider: DynProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl FunctionCall for FunctionCaller {
    async fn call_function(&self, function: &Function, args: &[DynSolValue]) -> Result<String> {
        let data = function
            .abi_encode_input(args)
            .map_err(|e| RewardsError::Abi(format!("cannot encode {} inputs: {e}", function.name)))?;

        debug!("eth_call {} on {}", function.signature(), self.address);

        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(data);
        let output = self
            .provider
            .call(tx)
            .await
            .map_err(|e| RewardsError::Call(e.to_string()))?;

        let values = function
            .abi_decode_output(&output)
            .map_err(|e| RewardsError::Call(format!("malformed response: {e}")))?;
        Ok(render_values(&values))
    }
}

/// A `(bytesN, uintN)` function picked from an ABI, used as a rewards source.
pub struct SelectedFunction<'a, C: ?Sized> {
    caller: &'a C,
    function: &'a Function,
    pool_kind: ParamKind,
    epoch_kind: ParamKind,
}

impl<'a, C: FunctionCall + ?Sized> SelectedFunction<'a, C> {
    pub fn new(caller: &'a C, function: &'a Function) -> Result<Self> {
        if !is_pool_epoch_call(function) {
            return Err(RewardsError::Abi(format!(
                "{} does not take (bytes32 poolId, uint256 epoch)",
                function.name
            )));
        }
        Ok(Self {
            caller,
            function,
            pool_kind: ParamKind::from_param(&function.inputs[0])?,
            epoch_kind: ParamKind::from_param(&function.inputs[1])?,
        })
    }

    fn args(&self, pool_id: B256, epoch: U256) -> Result<Vec<DynSolValue>> {
        let pool = match self.pool_kind {
            ParamKind::Bytes { size: Some(32) } => DynSolValue::FixedBytes(pool_id, 32),
            ParamKind::Bytes { size: None } => DynSolValue::Bytes(pool_id.to_vec()),
            other => {
                return Err(RewardsError::Abi(format!(
                    "pool id does not fit a {} parameter",
                    other.type_name()
                )))
            }
        };
        let epoch = self.epoch_kind.coerce(&epoch.to_string())?;
        Ok(vec![pool, epoch])
    }
}

#[async_trait]
impl<'a, C: FunctionCall + ?Sized> RewardsSource for SelectedFunction<'a, C> {
    async fn compute_rewards(&self, pool_id: B256, epoch: U256) -> Result<String> {
        let args = self.args(pool_id, epoch)?;
        self.caller.call_function(self.function, &args).await
    }
}
