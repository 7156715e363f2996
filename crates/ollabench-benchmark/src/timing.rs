//! Per-run rate extraction from the endpoint's counters.

use ollabench_core::RunResult;

use crate::ollama::GenerateResponse;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Share of wall-clock time attributed to prompt processing when the
/// endpoint reports a prompt count without a prompt duration.
pub const PROMPT_TIME_SHARE: f64 = 0.15;
/// Share attributed to generation when the eval duration is missing.
pub const EVAL_TIME_SHARE: f64 = 0.85;

/// Build the [`RunResult`] for one measured run.
///
/// `total_time` is the wall-clock duration of the call in seconds. A phase
/// whose count is positive but whose duration is exactly zero gets its
/// duration estimated from `total_time`.
pub fn extract_run(run: u32, response: &GenerateResponse, total_time: f64) -> RunResult {
    let prompt_eval_count = response.prompt_eval_count;
    let eval_count = response.eval_count;

    let mut prompt_time = response.prompt_eval_duration as f64 / NANOS_PER_SEC;
    let mut eval_time = response.eval_duration as f64 / NANOS_PER_SEC;

    if prompt_eval_count > 0 && response.prompt_eval_duration == 0 {
        prompt_time = total_time * PROMPT_TIME_SHARE;
    }
    if eval_count > 0 && response.eval_duration == 0 {
        eval_time = total_time * EVAL_TIME_SHARE;
    }

    RunResult {
        run,
        total_time,
        prompt_time,
        eval_time,
        prompt_tps: rate(prompt_eval_count, prompt_time),
        eval_tps: rate(eval_count, eval_time),
        prompt_eval_count,
        eval_count,
        total_tokens: prompt_eval_count + eval_count,
    }
}

fn rate(count: u64, secs: f64) -> f64 {
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}
