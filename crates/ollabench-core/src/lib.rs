pub mod config;
pub mod error;
pub mod text;
pub mod tier;

pub use config::{DefaultsConfig, OllaBenchSettings, OllamaConfig, DEFAULT_OLLAMA_HOST};
pub use error::{OllaBenchError, Result};
pub use text::{BenchmarkConfig, BenchmarkSummary, RunResult, StreamConfig, StreamingResult};
pub use tier::Tier;
