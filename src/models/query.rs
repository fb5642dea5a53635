use serde::Serialize;

use crate::models::PoolEntry;
use crate::utils::normalize_reward;

/// Outcome of one rewards lookup for one pool.
///
/// Exactly one of `raw_result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub pool_id: String,
    pub pool_name: String,
    #[serde(rename = "result")]
    pub raw_result: Option<String>,
    pub formatted_value: Option<String>,
    pub error: Option<String>,
}

impl QueryResult {
    pub fn success(pool: &PoolEntry, raw_result: String) -> Self {
        Self {
            pool_id: pool.id_hex(),
            pool_name: pool.name.clone(),
            formatted_value: Some(normalize_reward(&raw_result)),
            raw_result: Some(raw_result),
            error: None,
        }
    }

    pub fn failure(pool: &PoolEntry, error: impl ToString) -> Self {
        Self {
            pool_id: pool.id_hex(),
            pool_name: pool.name.clone(),
            raw_result: None,
            formatted_value: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one call in a multi-value batch (single-input functions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueResult {
    pub input: String,
    #[serde(rename = "result")]
    pub raw_result: Option<String>,
    pub formatted_value: Option<String>,
    pub error: Option<String>,
}

impl ValueResult {
    pub fn success(input: String, raw_result: String) -> Self {
        Self {
            input,
            formatted_value: Some(normalize_reward(&raw_result)),
            raw_result: Some(raw_result),
            error: None,
        }
    }

    pub fn failure(input: String, error: impl ToString) -> Self {
        Self {
            input,
            raw_result: None,
            formatted_value: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Success/failure counts of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn tally(outcomes: impl Iterator<Item = bool>) -> Self {
        outcomes.fold(Self::default(), |mut acc, ok| {
            acc.total += 1;
            if ok {
                acc.successful += 1;
            } else {
                acc.failed += 1;
            }
            acc
        })
    }
}

impl From<&[QueryResult]> for BatchSummary {
    fn from(results: &[QueryResult]) -> Self {
        Self::tally(results.iter().map(QueryResult::is_success))
    }
}

impl From<&[ValueResult]> for BatchSummary {
    fn from(results: &[ValueResult]) -> Self {
        Self::tally(results.iter().map(ValueResult::is_success))
    }
}
