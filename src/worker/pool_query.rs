//! Epoch lookup over the configured pool set.

use alloy::primitives::U256;
use log::{error, info};

use super::CsvRecorder;
use crate::client::RewardsSource;
use crate::error::Result;
use crate::models::{BatchSummary, PoolSet, QueryResult};

/// Query every pool for `epoch`, strictly one after another, in set order.
///
/// A failed call is captured in that pool's [`QueryResult`] and does not stop
/// the batch. When a recorder is given, each successful result is appended to
/// the CSV log as it arrives; a write failure aborts the batch.
pub async fn query_pools<S>(
    source: &S,
    pools: &PoolSet,
    epoch: U256,
    recorder: Option<&CsvRecorder>,
) -> Result<Vec<QueryResult>>
where
    S: RewardsSource + ?Sized,
{
    let total = pools.len();
    info!("Processing {} predefined pool IDs with epoch = {}", total, epoch);

    let mut results = Vec::with_capacity(total);

    for (i, pool) in pools.iter().enumerate() {
        info!(
            "[{}/{}] Processing {} with bytes32 ID: {}",
            i + 1,
            total,
            pool.name,
            pool.id_hex()
        );

        match source.compute_rewards(pool.id, epoch).await {
            Ok(raw) => {
                info!("Result for {}: {}", pool.name, raw);
                if let Some(recorder) = recorder {
                    recorder.record(&[pool.id_hex(), epoch.to_string()], &raw, Some(&pool.name))?;
                }
                results.push(QueryResult::success(pool, raw));
            }
            Err(e) => {
                error!("Error processing {}: {}", pool.name, e);
                results.push(QueryResult::failure(pool, e));
            }
        }
    }

    let summary = BatchSummary::from(results.as_slice());
    info!(
        "Processed {} pools: {} successful, {} failed",
        summary.total, summary.successful, summary.failed
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewardsError;
    use crate::store::CsvAppender;
    use alloy::primitives::B256;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Returns `pool byte * 10^18 + epoch` and fails for selected pools.
    struct ScriptedSource {
        failing: HashSet<B256>,
        seen: Mutex<Vec<B256>>,
    }

    impl ScriptedSource {
        fn new(failing: impl IntoIterator<Item = B256>) -> Self {
            Self {
                failing: failing.into_iter().collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RewardsSource for ScriptedSource {
        async fn compute_rewards(&self, pool_id: B256, epoch: U256) -> Result<String> {
            self.seen.lock().unwrap().push(pool_id);
            if self.failing.contains(&pool_id) {
                return Err(RewardsError::Call("execution reverted".to_string()));
            }
            let whole = U256::from(pool_id[31]) * U256::from(10u64).pow(U256::from(18));
            Ok((whole + epoch).to_string())
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let pools = PoolSet::default();
        let third = pools.entries()[2].id;
        let source = ScriptedSource::new([third]);

        let results = query_pools(&source, &pools, U256::from(42), None).await.unwrap();

        assert_eq!(results.len(), 5);
        assert!(results[2].raw_result.is_none());
        assert!(results[2].formatted_value.is_none());
        assert_eq!(
            results[2].error.as_deref(),
            Some("Contract call failed: execution reverted")
        );
        for i in [0, 1, 3, 4] {
            assert!(results[i].raw_result.is_some());
            assert!(results[i].formatted_value.is_some());
            assert!(results[i].error.is_none());
            assert_eq!(results[i].pool_name, pools.entries()[i].name);
        }
    }

    #[tokio::test]
    async fn test_pools_are_queried_in_order() {
        let pools = PoolSet::default();
        let source = ScriptedSource::new([]);

        query_pools(&source, &pools, U256::ZERO, None).await.unwrap();

        let seen = source.seen.lock().unwrap().clone();
        let expected: Vec<B256> = pools.iter().map(|p| p.id).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_successes_are_recorded_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let recorder = CsvRecorder::new(
            CsvAppender::new(&path),
            "computeRewards",
            vec!["input1".to_string(), "input2".to_string()],
        );

        let pools = PoolSet::default();
        let source = ScriptedSource::new([pools.entries()[0].id]);
        let results = query_pools(&source, &pools, U256::from(7), Some(&recorder))
            .await
            .unwrap();
        assert_eq!(BatchSummary::from(results.as_slice()).successful, 4);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Timestamp,Function,input1,input2,Result,FormattedResult,PoolName"
        );
        let second = &pools.entries()[1];
        let expected_tail = format!(
            ",computeRewards,{},7,{},{},{}",
            second.id_hex(),
            results[1].raw_result.as_deref().unwrap(),
            results[1].formatted_value.as_deref().unwrap(),
            second.name
        );
        assert!(lines[1].ends_with(&expected_tail), "{}", lines[1]);
    }

    #[tokio::test]
    async fn test_csv_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CsvRecorder::new(
            CsvAppender::new(dir.path().join("missing").join("results.csv")),
            "computeRewards",
            vec![],
        );
        let source = ScriptedSource::new([]);
        let err = query_pools(&source, &PoolSet::default(), U256::from(1), Some(&recorder))
            .await
            .unwrap_err();
        assert!(matches!(err, RewardsError::Io(_)));
    }
}
