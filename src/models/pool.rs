use alloy::primitives::B256;
use serde::{Serialize, Serializer};

use crate::error::{Result, RewardsError};
use crate::utils::{format_pool_id, parse_pool_id};

/// Name reported for pool ids outside the configured set.
pub const CUSTOM_POOL_NAME: &str = "Custom Pool";

/// Built-in pool ids, matched by index with [`DEFAULT_POOL_NAMES`].
pub const DEFAULT_POOL_IDS: [&str; 5] = [
    "0x02d1dc927ecebd87407e1a58a6f2d81f0d6c0ade72ac926e865310aa482b893a",
    "0x726dd6a67a7c5b399e0e6954596d6b01605ec97e34e75f5547416146ec001a6c",
    "0x74b6b9b1267a0a12d24cfa963f1a3c96aae2f2cd870847cbc9a70c46b7803ae1",
    "0xbb8c79b0fc39426b2cf4bb42501aaa2bdcc7a72f86a564d44a42c6385496618d",
    "0x36ff4f3050b6a776353d7d160276dcf6b310a658502e226fdd2fa049e6c603dd",
];

pub const DEFAULT_POOL_NAMES: [&str; 5] = [
    "PancakeSwap WETH",
    "PancakeSwap WBTC",
    "OrangeFinance PCS WETH",
    "OrangeFinance PCS WBTC",
    "OrangeFinance PCS ARB",
];

/// A rewards pool queried for every epoch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolEntry {
    #[serde(rename = "poolId", serialize_with = "serialize_pool_id")]
    pub id: B256,
    #[serde(rename = "poolName")]
    pub name: String,
}

fn serialize_pool_id<S: Serializer>(id: &B256, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_pool_id(id))
}

impl PoolEntry {
    pub fn id_hex(&self) -> String {
        format_pool_id(&self.id)
    }
}

/// Ordered, immutable set of pools for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSet {
    entries: Vec<PoolEntry>,
}

impl PoolSet {
    /// Pair ids with names by position.
    ///
    /// Missing names fall back to `Pool N` (1-indexed); surplus names are ignored.
    pub fn from_parts<I, N>(ids: &[I], names: &[N]) -> Result<Self>
    where
        I: AsRef<str>,
        N: AsRef<str>,
    {
        if ids.is_empty() {
            return Err(RewardsError::Config("pool id list is empty".to_string()));
        }

        let entries = ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let id = parse_pool_id(id.as_ref()).map_err(|_| {
                    RewardsError::Config(format!(
                        "pool id {} ({:?}) is not a 0x-prefixed bytes32 value",
                        index + 1,
                        id.as_ref()
                    ))
                })?;
                let name = names
                    .get(index)
                    .map(|n| n.as_ref().trim())
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Pool {}", index + 1));
                Ok(PoolEntry { id, name })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoolEntry> {
        self.entries.iter()
    }

    /// Configured name for `id`, or [`CUSTOM_POOL_NAME`].
    pub fn name_for(&self, id: &B256) -> &str {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| entry.name.as_str())
            .unwrap_or(CUSTOM_POOL_NAME)
    }
}

impl Default for PoolSet {
    fn default() -> Self {
        let entries = DEFAULT_POOL_IDS
            .iter()
            .zip(DEFAULT_POOL_NAMES)
            .filter_map(|(id, name)| {
                parse_pool_id(id).ok().map(|id| PoolEntry {
                    id,
                    name: name.to_string(),
                })
            })
            .collect();
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a PoolSet {
    type Item = &'a PoolEntry;
    type IntoIter = std::slice::Iter<'a, PoolEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_set() {
        let pools = PoolSet::default();
        assert_eq!(pools.len(), 5);
        assert_eq!(pools.entries()[0].name, "PancakeSwap WETH");
        assert_eq!(pools.entries()[4].id_hex(), DEFAULT_POOL_IDS[4]);
    }

    #[test]
    fn test_missing_names_fall_back_to_position() {
        let pools = PoolSet::from_parts(&DEFAULT_POOL_IDS[..3], &["first"]).unwrap();
        let names: Vec<_> = pools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "Pool 2", "Pool 3"]);
    }

    #[test]
    fn test_surplus_names_ignored() {
        let pools = PoolSet::from_parts(&DEFAULT_POOL_IDS[..1], &DEFAULT_POOL_NAMES).unwrap();
        assert_eq!(pools.len(), 1);
    }

    #[test]
    fn test_invalid_id_is_config_error() {
        let err = PoolSet::from_parts(&["0x1234"], &["bad"]).unwrap_err();
        assert!(matches!(err, RewardsError::Config(_)));

        let empty: [&str; 0] = [];
        assert!(PoolSet::from_parts(&empty, &empty).is_err());
    }

    #[test]
    fn test_name_for_unknown_id() {
        let pools = PoolSet::default();
        let known = pools.entries()[1].id;
        assert_eq!(pools.name_for(&known), "PancakeSwap WBTC");
        assert_eq!(pools.name_for(&B256::ZERO), CUSTOM_POOL_NAME);
    }

    #[test]
    fn test_pool_entry_json() {
        let pools = PoolSet::default();
        let json = serde_json::to_value(&pools.entries()[0]).unwrap();
        assert_eq!(json["poolId"], DEFAULT_POOL_IDS[0]);
        assert_eq!(json["poolName"], "PancakeSwap WETH");
    }
}
