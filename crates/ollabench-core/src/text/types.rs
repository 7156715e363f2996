use serde::{Deserialize, Serialize};

/// Timing of one completed measured run. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run: u32,
    pub total_time: f64,
    pub prompt_time: f64,
    pub eval_time: f64,
    pub prompt_tps: f64,
    pub eval_tps: f64,
    pub prompt_eval_count: u64,
    pub eval_count: u64,
    pub total_tokens: u64,
}

impl RunResult {
    /// Both phases produced a positive rate.
    pub fn is_successful(&self) -> bool {
        self.prompt_tps > 0.0 && self.eval_tps > 0.0
    }
}

/// Averages over the successful runs of a session.
///
/// `successful_runs` is always at least 1 and never exceeds `attempted_runs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub model: String,
    pub avg_prompt_tps: f64,
    pub avg_eval_tps: f64,
    pub avg_total_time: f64,
    pub successful_runs: u32,
    pub attempted_runs: u32,
    pub results: Vec<RunResult>,
}

impl BenchmarkSummary {
    pub fn failed_runs(&self) -> u32 {
        self.attempted_runs - self.successful_runs
    }
}

/// Outcome of a single streamed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingResult {
    pub model: String,
    /// Fragments that carried text.
    pub tokens: u64,
    pub chars: u64,
    /// First fragment arrival to final fragment arrival.
    pub elapsed_secs: f64,
    pub tokens_per_sec: f64,
    pub max_tokens: u32,
    /// The stream ended with a `done` marker.
    pub done: bool,
}
