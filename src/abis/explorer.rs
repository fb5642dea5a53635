//! Contract ABI download from an Etherscan-compatible block explorer, plus
//! the on-disk ABI cache.

use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use log::info;
use serde::Deserialize;

use crate::error::{Result, RewardsError};

/// Raw `module=contract&action=getabi` response.
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    pub status: String,
    pub message: String,
    pub result: serde_json::Value,
}

#[derive(Clone)]
pub struct AbiFetcher {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl AbiFetcher {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
        }
    }

    pub async fn fetch_abi(&self, address: Address) -> Result<JsonAbi> {
        info!("Fetching contract ABI for {} from {}", address, self.api_url);

        let address = address.to_string();
        let response: ExplorerResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address.as_str()),
                ("apikey", self.api_key.as_deref().unwrap_or("")),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        abi_from_response(response)
    }
}

/// Extract the ABI from an explorer response, or the explorer's error message.
pub fn abi_from_response(response: ExplorerResponse) -> Result<JsonAbi> {
    if response.status != "1" || !response.message.starts_with("OK") {
        let detail = match &response.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(RewardsError::Explorer(format!(
            "{} ({})",
            response.message, detail
        )));
    }

    let abi_json = response
        .result
        .as_str()
        .ok_or_else(|| RewardsError::Abi("explorer result is not an ABI string".to_string()))?;
    parse_abi(abi_json)
}

pub fn parse_abi(json: &str) -> Result<JsonAbi> {
    serde_json::from_str(json).map_err(|e| RewardsError::Abi(format!("invalid ABI JSON: {e}")))
}

pub fn load_abi_file(path: impl AsRef<Path>) -> Result<JsonAbi> {
    let content = std::fs::read_to_string(path)?;
    parse_abi(&content)
}

pub fn save_abi_file(path: impl AsRef<Path>, abi: &JsonAbi) -> Result<()> {
    let json = serde_json::to_string_pretty(abi)?;
    std::fs::write(path, json)?;
    Ok(())
}
