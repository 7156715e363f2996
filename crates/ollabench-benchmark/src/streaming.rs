//! Generation throughput measured from a streamed reply.
//!
//! The clock starts when the first fragment arrives, so connection setup and
//! queueing before generation begins are not counted against the model.

use std::time::{Duration, Instant};

use ollabench_core::{StreamConfig, StreamingResult};
use tracing::{debug, info, instrument, warn};

use crate::error::{BenchmarkError, Result};
use crate::ollama::{GenerateBackend, GenerateRequest, OllamaClient};

pub const STREAM_TIMEOUT: Duration = Duration::from_secs(600);

/// A stream fragment stamped with its arrival offset from request submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFragment {
    pub text: String,
    pub done: bool,
    pub arrived: Duration,
}

#[derive(Debug, Default)]
pub struct StreamCollector {
    first: Option<Duration>,
    last: Option<Duration>,
    tokens: u64,
    chars: u64,
    done: bool,
}

impl StreamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fragment. Returns `true` once the `done` marker has been seen;
    /// fragments pushed after that are ignored.
    pub fn push(&mut self, fragment: &TimedFragment) -> bool {
        if self.done {
            return true;
        }

        self.first.get_or_insert(fragment.arrived);
        self.last = Some(fragment.arrived);

        if !fragment.text.is_empty() {
            self.tokens += 1;
            self.chars += fragment.text.chars().count() as u64;
        }

        self.done = fragment.done;
        self.done
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn finish(self, model: &str, max_tokens: u32) -> Result<StreamingResult> {
        let (Some(first), Some(last)) = (self.first, self.last) else {
            return Err(BenchmarkError::NoFragments);
        };
        if self.tokens == 0 {
            return Err(BenchmarkError::NoFragments);
        }

        let elapsed_secs = last.saturating_sub(first).as_secs_f64();
        let tokens_per_sec = if elapsed_secs > 0.0 {
            self.tokens as f64 / elapsed_secs
        } else {
            0.0
        };

        Ok(StreamingResult {
            model: model.to_string(),
            tokens: self.tokens,
            chars: self.chars,
            elapsed_secs,
            tokens_per_sec,
            max_tokens,
            done: self.done,
        })
    }
}

/// Fold already-timed fragments into a result, stopping at the `done` marker.
pub fn collect_fragments<I>(fragments: I, model: &str, max_tokens: u32) -> Result<StreamingResult>
where
    I: IntoIterator<Item = TimedFragment>,
{
    let mut collector = StreamCollector::new();
    for fragment in fragments {
        if collector.push(&fragment) {
            break;
        }
    }
    collector.finish(model, max_tokens)
}

pub struct StreamingRunner<B = OllamaClient> {
    backend: B,
}

impl StreamingRunner<OllamaClient> {
    pub fn new(ollama_host: &str) -> Self {
        Self::with_backend(OllamaClient::new(ollama_host))
    }
}

impl<B: GenerateBackend> StreamingRunner<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn run(&self, config: &StreamConfig) -> Result<StreamingResult> {
        self.run_with_observer(config, |_| {})
    }

    /// Stream one generation, passing each non-empty text fragment to
    /// `on_text` as it arrives.
    #[instrument(skip(self, config, on_text), fields(model = %config.model, max_tokens = config.max_tokens))]
    pub fn run_with_observer<F>(&self, config: &StreamConfig, mut on_text: F) -> Result<StreamingResult>
    where
        F: FnMut(&str),
    {
        config.validate()?;
        info!("Starting streaming generation");

        let request = GenerateRequest::streaming(config);
        let submitted = Instant::now();

        let chunks = self
            .backend
            .generate_stream(&request, STREAM_TIMEOUT)
            .map_err(|e| {
                warn!("Streaming request failed: {}", e);
                BenchmarkError::Stream(e)
            })?;

        let mut collector = StreamCollector::new();
        for chunk in chunks {
            let chunk = chunk.map_err(|e| {
                warn!(tokens = collector.tokens(), "Stream interrupted: {}", e);
                BenchmarkError::Stream(e)
            })?;

            let fragment = TimedFragment {
                arrived: submitted.elapsed(),
                text: chunk.response,
                done: chunk.done,
            };
            if !fragment.text.is_empty() {
                on_text(&fragment.text);
            }
            if collector.push(&fragment) {
                debug!("Received done marker");
                break;
            }
        }

        let result = collector.finish(&config.model, config.max_tokens)?;
        info!(
            tokens = result.tokens,
            elapsed_secs = result.elapsed_secs,
            tokens_per_sec = result.tokens_per_sec,
            "Streaming generation complete"
        );
        Ok(result)
    }
}
