//! Averaging over the successful measured runs.

use ollabench_core::{BenchmarkSummary, RunResult};
use tracing::{info, warn};

use crate::error::{BenchmarkError, Result};

/// Summarize a session. Runs where either phase has a non-positive rate are
/// dropped before averaging; `attempted` counts every measured run index
/// including the ones whose call failed outright.
pub fn summarize(model: &str, results: Vec<RunResult>, attempted: u32) -> Result<BenchmarkSummary> {
    let successful: Vec<RunResult> = results.into_iter().filter(RunResult::is_successful).collect();

    if successful.is_empty() {
        warn!(attempted, "No successful runs");
        return Err(BenchmarkError::NoSuccessfulRuns { attempted });
    }

    let n = successful.len() as f64;
    let avg_prompt_tps = successful.iter().map(|r| r.prompt_tps).sum::<f64>() / n;
    let avg_eval_tps = successful.iter().map(|r| r.eval_tps).sum::<f64>() / n;
    let avg_total_time = successful.iter().map(|r| r.total_time).sum::<f64>() / n;

    let successful_runs = successful.len() as u32;
    let attempted_runs = attempted;
    debug_assert!(
        successful_runs <= attempted_runs,
        "{successful_runs} successful runs out of {attempted_runs} attempted"
    );

    if successful_runs < attempted_runs {
        warn!(
            failed = attempted_runs - successful_runs,
            successful = successful_runs,
            "Some runs failed, averaging successful runs only"
        );
    }

    info!(
        model,
        avg_prompt_tps, avg_eval_tps, avg_total_time, successful_runs, "Benchmark summary"
    );

    Ok(BenchmarkSummary {
        model: model.to_string(),
        avg_prompt_tps,
        avg_eval_tps,
        avg_total_time,
        successful_runs,
        attempted_runs,
        results: successful,
    })
}
