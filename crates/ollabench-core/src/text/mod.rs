mod benchmark_config;
mod types;

pub use benchmark_config::{BenchmarkConfig, StreamConfig};
pub use types::{BenchmarkSummary, RunResult, StreamingResult};
