pub mod aggregate;
pub mod classify;
pub mod error;
pub mod ollama;
pub mod prompt;
pub mod runner;
pub mod streaming;
pub mod timing;

#[cfg(test)]
mod testing;

pub use aggregate::summarize;
pub use classify::{assess, classify_eval_tps, classify_prompt_tps, eval_band, prompt_band, Assessment};
pub use error::{BenchmarkError, Result};
pub use ollama::{
    CallError, FragmentStream, GenerateBackend, GenerateOptions, GenerateRequest, GenerateResponse,
    OllamaClient, StreamChunk,
};
pub use prompt::{build_prompt, STREAMING_PROMPT};
pub use runner::{warmup_timeout, BenchmarkEvent, BenchmarkRunner, MEASURED_RUN_TIMEOUT};
pub use streaming::{collect_fragments, StreamCollector, StreamingRunner, TimedFragment, STREAM_TIMEOUT};
pub use timing::extract_run;
