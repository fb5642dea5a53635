//! Calls of arbitrary read functions: single calls and multi-value batches.

use alloy::json_abi::Function;
use log::{error, info};

use super::CsvRecorder;
use crate::abis::{render_value, ParamKind};
use crate::client::FunctionCall;
use crate::error::{Result, RewardsError};
use crate::models::{BatchSummary, ValueResult};

/// Call a single-input function once per value, in order.
///
/// All values are validated before the first call; an invalid value fails
/// the whole batch with [`RewardsError::InvalidInput`]. Call failures are
/// captured per value.
pub async fn query_values<C>(
    caller: &C,
    function: &Function,
    values: &[String],
    recorder: Option<&CsvRecorder>,
) -> Result<Vec<ValueResult>>
where
    C: FunctionCall + ?Sized,
{
    let param = function.inputs.first().ok_or_else(|| {
        RewardsError::Abi(format!("{} takes no inputs", function.name))
    })?;
    let kind = ParamKind::from_param(param)?;

    let args = values
        .iter()
        .map(|v| kind.coerce(v))
        .collect::<Result<Vec<_>>>()?;

    let total = args.len();
    info!("Processing {} values for {}...", total, function.name);

    let mut results = Vec::with_capacity(total);
    for (i, arg) in args.into_iter().enumerate() {
        let input = render_value(&arg);
        info!("[{}/{}] Processing value: {}", i + 1, total, input);

        match caller.call_function(function, std::slice::from_ref(&arg)).await {
            Ok(raw) => {
                info!("Result: {}", raw);
                if let Some(recorder) = recorder {
                    recorder.record(std::slice::from_ref(&input), &raw, None)?;
                }
                results.push(ValueResult::success(input, raw));
            }
            Err(e) => {
                error!("Error processing value {}: {}", input, e);
                results.push(ValueResult::failure(input, e));
            }
        }
    }

    let summary = BatchSummary::from(results.as_slice());
    info!(
        "Processed {} values: {} successful, {} failed",
        summary.total, summary.successful, summary.failed
    );

    Ok(results)
}

/// Validate `inputs` against the function's parameters and make one call.
///
/// Unlike the batch helpers, a call failure is returned as an error.
pub async fn call_once<C>(
    caller: &C,
    function: &Function,
    inputs: &[String],
    recorder: Option<&CsvRecorder>,
) -> Result<String>
where
    C: FunctionCall + ?Sized,
{
    if inputs.len() != function.inputs.len() {
        return Err(RewardsError::Abi(format!(
            "{} expects {} inputs, got {}",
            function.name,
            function.inputs.len(),
            inputs.len()
        )));
    }

    let args = function
        .inputs
        .iter()
        .zip(inputs)
        .map(|(param, raw)| ParamKind::from_param(param)?.coerce(raw))
        .collect::<Result<Vec<_>>>()?;

    info!("Calling contract function {}...", function.name);
    let raw = caller.call_function(function, &args).await?;

    if let Some(recorder) = recorder {
        let rendered: Vec<String> = args.iter().map(render_value).collect();
        recorder.record(&rendered, &raw, None)?;
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abis::functions::tests::sample_abi;
    use crate::abis::render_values;
    use crate::store::CsvAppender;
    use alloy::dyn_abi::DynSolValue;
    use alloy::primitives::U256;
    use async_trait::async_trait;

    /// Doubles uint inputs; fails on 13.
    struct Doubler;

    #[async_trait]
    impl FunctionCall for Doubler {
        async fn call_function(&self, _function: &Function, args: &[DynSolValue]) -> Result<String> {
            match args {
                [DynSolValue::Uint(v, _)] if *v == U256::from(13) => {
                    Err(RewardsError::Call("unlucky".to_string()))
                }
                [DynSolValue::Uint(v, _)] => Ok((*v * U256::from(2)).to_string()),
                other => Ok(render_values(other)),
            }
        }
    }

    #[tokio::test]
    async fn test_query_values_captures_failures() {
        let abi = sample_abi();
        let function = &abi.function("epochStart").unwrap()[0];
        let values: Vec<String> = ["1", "13", "0x10"].iter().map(|s| s.to_string()).collect();

        let results = query_values(&Doubler, function, &values, None).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].raw_result.as_deref(), Some("2"));
        assert!(results[1].error.is_some());
        assert_eq!(results[2].input, "16");
        assert_eq!(results[2].raw_result.as_deref(), Some("32"));
    }

    #[tokio::test]
    async fn test_query_values_validates_before_calling() {
        let abi = sample_abi();
        let function = &abi.function("epochStart").unwrap()[0];
        let values = vec!["1".to_string(), "nope".to_string()];
        let err = query_values(&Doubler, function, &values, None).await.unwrap_err();
        assert!(matches!(err, RewardsError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_call_once_records_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let abi = sample_abi();
        let function = &abi.function("epochStart").unwrap()[0];
        let recorder = CsvRecorder::new(CsvAppender::new(&path), "epochStart", vec![String::new()]);

        let raw = call_once(&Doubler, function, &["5".to_string()], Some(&recorder))
            .await
            .unwrap();
        assert_eq!(raw, "10");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Timestamp,Function,Input1,Result,FormattedResult,PoolName");
        assert!(lines[1].ends_with(",epochStart,5,10,0,Unknown"));
    }

    #[tokio::test]
    async fn test_call_once_propagates_call_error() {
        let abi = sample_abi();
        let function = &abi.function("epochStart").unwrap()[0];
        let err = call_once(&Doubler, function, &["13".to_string()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, RewardsError::Call(_)));

        let err = call_once(&Doubler, function, &[], None).await.unwrap_err();
        assert!(matches!(err, RewardsError::Abi(_)));
    }
}
