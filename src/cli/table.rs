use crate::models::{BatchSummary, QueryResult, ValueResult};

/// Two-column text table of pool rewards.
pub fn render_pool_table(results: &[QueryResult]) -> String {
    let rows: Vec<(String, String)> = results
        .iter()
        .map(|r| (r.pool_name.clone(), cell(&r.formatted_value, &r.error)))
        .collect();
    render_table(("Pool", "Rewards"), &rows)
}

/// Two-column text table of multi-value batch results.
pub fn render_value_table(results: &[ValueResult]) -> String {
    let rows: Vec<(String, String)> = results
        .iter()
        .map(|r| (r.input.clone(), cell(&r.raw_result, &r.error)))
        .collect();
    render_table(("Input", "Result"), &rows)
}

pub fn render_summary(title: &str, summary: &BatchSummary) -> String {
    format!(
        "===== {} =====\nTotal processed: {}\nSuccessful: {}\nFailed: {}",
        title, summary.total, summary.successful, summary.failed
    )
}

fn cell(value: &Option<String>, error: &Option<String>) -> String {
    match (value, error) {
        (_, Some(error)) => format!("error: {error}"),
        (Some(value), None) => value.clone(),
        (None, None) => String::new(),
    }
}

fn render_table(header: (&str, &str), rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .chain(std::iter::once(header.0.len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}  {}\n", header.0, header.1);
    out.push_str(&format!("{}  {}\n", "-".repeat(width), "-".repeat(header.1.len())));
    for (left, right) in rows {
        out.push_str(&format!("{left:<width$}  {right}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PoolSet;

    #[test]
    fn test_pool_table() {
        let pools = PoolSet::from_parts(
            &[crate::models::DEFAULT_POOL_IDS[0], crate::models::DEFAULT_POOL_IDS[1]],
            &["A", "Longer name"],
        )
        .unwrap();
        let results = vec![
            QueryResult::success(&pools.entries()[0], "1500000000000000000".into()),
            QueryResult::failure(&pools.entries()[1], "reverted"),
        ];
        assert_eq!(
            render_pool_table(&results),
            "Pool         Rewards\n\
             -----------  -------\n\
             A            1.5\n\
             Longer name  error: reverted\n"
        );
    }

    #[test]
    fn test_summary() {
        let summary = BatchSummary {
            total: 5,
            successful: 4,
            failed: 1,
        };
        assert_eq!(
            render_summary("PROCESSING SUMMARY", &summary),
            "===== PROCESSING SUMMARY =====\nTotal processed: 5\nSuccessful: 4\nFailed: 1"
        );
    }
}
