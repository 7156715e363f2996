use ollabench_core::OllaBenchError;
use thiserror::Error;

use crate::ollama::CallError;

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error(transparent)]
    Config(#[from] OllaBenchError),

    #[error("Warmup failed: {0}")]
    WarmupFailed(CallError),

    #[error("No successful runs ({attempted} attempted)")]
    NoSuccessfulRuns { attempted: u32 },

    #[error("Streaming request failed: {0}")]
    Stream(CallError),

    #[error("Stream produced no tokens")]
    NoFragments,
}

pub type Result<T> = std::result::Result<T, BenchmarkError>;
