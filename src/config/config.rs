use alloy::primitives::Address;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{Result, RewardsError};
use crate::models::{PoolSet, DEFAULT_POOL_IDS, DEFAULT_POOL_NAMES};

/// Rewards distributor queried by the web form when no address is configured.
pub const DEFAULT_REWARDS_CONTRACT: &str = "0x82C13fCab02A168F06E12373F9e5D2C2Bd47e399";

/// Root application configuration.
///
/// Loaded once at startup from built-in defaults, an optional `config.*`
/// file and environment variables (`RPC_URL`, `CONTRACT_ADDRESS`,
/// `ARBISCAN_API_KEY`, `OUTPUT_FILE_PATH`, `POOL_IDS`, ...), in that order of
/// precedence. Never mutated afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Contract whose read functions are called. The interactive mode
    /// prompts for it when unset.
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Etherscan-compatible API used to download contract ABIs
    #[serde(default = "default_explorer_api_url")]
    pub explorer_api_url: String,
    #[serde(default, alias = "arbiscan_api_key")]
    pub explorer_api_key: Option<String>,
    #[serde(default = "default_output_file_path")]
    pub output_file_path: String,
    #[serde(default = "default_abi_cache_path")]
    pub abi_cache_path: String,
    #[serde(default = "default_pool_ids")]
    pub pool_ids: Vec<String>,
    #[serde(default = "default_pool_names")]
    pub pool_names: Vec<String>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_rpc_url() -> String {
    "https://arb1.arbitrum.io/rpc".to_string()
}

fn default_explorer_api_url() -> String {
    "https://api.arbiscan.io/api".to_string()
}

fn default_output_file_path() -> String {
    "./results.csv".to_string()
}

fn default_abi_cache_path() -> String {
    "contract-abi.json".to_string()
}

fn default_pool_ids() -> Vec<String> {
    DEFAULT_POOL_IDS.iter().map(|s| s.to_string()).collect()
}

fn default_pool_names() -> Vec<String> {
    DEFAULT_POOL_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

impl Settings {
    /// Load settings using `file_name` (extension optional) as the file source.
    pub fn load(file_name: &str) -> std::result::Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(file_name).required(false))
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("pool_ids")
                    .with_list_parse_key("pool_names"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// The configured pool set, validated.
    pub fn pools(&self) -> Result<PoolSet> {
        let ids: Vec<&str> = self
            .pool_ids
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        PoolSet::from_parts(&ids, &self.pool_names)
    }

    /// The configured contract address, if any.
    pub fn contract(&self) -> Result<Option<Address>> {
        match self.contract_address.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_address(raw).map(Some),
        }
    }

    /// The configured contract, or the built-in rewards distributor.
    pub fn rewards_contract(&self) -> Result<Address> {
        match self.contract()? {
            Some(address) => Ok(address),
            None => parse_address(DEFAULT_REWARDS_CONTRACT),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: None,
            explorer_api_url: default_explorer_api_url(),
            explorer_api_key: None,
            output_file_path: default_output_file_path(),
            abi_cache_path: default_abi_cache_path(),
            pool_ids: default_pool_ids(),
            pool_names: default_pool_names(),
            bind_address: default_bind_address(),
        }
    }
}

pub fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| RewardsError::Config(format!("invalid contract address {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build_default_pools() {
        let settings = Settings::default();
        assert_eq!(settings.pools().unwrap(), PoolSet::default());
        assert!(settings.contract().unwrap().is_none());
        assert_eq!(
            settings.rewards_contract().unwrap(),
            parse_address(DEFAULT_REWARDS_CONTRACT).unwrap()
        );
    }

    #[test]
    fn test_blank_pool_ids_are_skipped() {
        let settings = Settings {
            pool_ids: vec![
                format!(" {} ", DEFAULT_POOL_IDS[0]),
                String::new(),
                DEFAULT_POOL_IDS[1].to_string(),
            ],
            pool_names: vec![],
            ..Settings::default()
        };
        let pools = settings.pools().unwrap();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools.entries()[1].name, "Pool 2");
    }

    #[test]
    fn test_invalid_contract_address() {
        let settings = Settings {
            contract_address: Some("0x123".to_string()),
            ..Settings::default()
        };
        assert!(matches!(settings.contract(), Err(RewardsError::Config(_))));
    }

    #[test]
    fn test_deserialize_partial_file() {
        let parsed: Settings = Config::builder()
            .add_source(config::File::from_str(
                r#"{"rpc_url": "http://localhost:8545", "arbiscan_api_key": "KEY"}"#,
                config::FileFormat::Json,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(parsed.rpc_url, "http://localhost:8545");
        assert_eq!(parsed.explorer_api_key.as_deref(), Some("KEY"));
        assert_eq!(parsed.output_file_path, "./results.csv");
        assert_eq!(parsed.pool_ids.len(), 5);
    }
}
