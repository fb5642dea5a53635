use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IRewardsDistributor {
        function computeRewards(bytes32 poolId, uint256 epoch) external view returns (uint256);
    }
}

/// Name of the rewards view function, as written to the CSV `Function` column.
pub const COMPUTE_REWARDS: &str = "computeRewards";

/// Parameter names of `computeRewards`, used as CSV input headers.
pub fn compute_rewards_input_names() -> Vec<String> {
    vec!["poolId".to_string(), "epoch".to_string()]
}
