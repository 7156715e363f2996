use std::time::{Duration, Instant};

use ollabench_core::{BenchmarkConfig, BenchmarkSummary, RunResult};
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::summarize;
use crate::error::{BenchmarkError, Result};
use crate::ollama::{GenerateBackend, GenerateRequest, OllamaClient};
use crate::prompt::build_prompt;
use crate::timing::extract_run;

/// Lower bound on the warmup timeout.
pub const MIN_WARMUP_TIMEOUT: Duration = Duration::from_secs(120);
/// Combined prompt+generation rate assumed when scaling the warmup timeout.
const WARMUP_ASSUMED_TPS: f64 = 20.0;
/// Timeout of every measured run, regardless of requested length.
pub const MEASURED_RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// `max(120s, (prompt_tokens + max_tokens) / 20 s)`.
pub fn warmup_timeout(prompt_tokens: u32, max_tokens: u32) -> Duration {
    let scaled = (f64::from(prompt_tokens) + f64::from(max_tokens)) / WARMUP_ASSUMED_TPS;
    Duration::from_secs_f64(scaled).max(MIN_WARMUP_TIMEOUT)
}

#[derive(Debug, Clone)]
pub enum BenchmarkEvent {
    WarmupStarted { timeout: Duration },
    WarmupComplete,
    WarmupFailed { message: String },
    RunStarted { run: u32, total: u32 },
    RunComplete { result: RunResult, requested_tokens: u32 },
    RunFailed { run: u32, message: String },
    Done { summary: BenchmarkSummary },
    NoSuccessfulRuns { attempted: u32 },
}

/// Runs a warmup call followed by sequential measured calls against one model.
pub struct BenchmarkRunner<B = OllamaClient> {
    backend: B,
}

impl BenchmarkRunner<OllamaClient> {
    pub fn new(ollama_host: &str) -> Self {
        Self::with_backend(OllamaClient::new(ollama_host))
    }
}

impl<B: GenerateBackend> BenchmarkRunner<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn run(&self, config: &BenchmarkConfig) -> Result<BenchmarkSummary> {
        self.run_with_events(config, |_| {})
    }

    #[instrument(skip(self, config, on_event), fields(model = %config.model, runs = config.num_runs))]
    pub fn run_with_events<F>(&self, config: &BenchmarkConfig, mut on_event: F) -> Result<BenchmarkSummary>
    where
        F: FnMut(BenchmarkEvent),
    {
        config.validate()?;
        info!(
            prompt_tokens = config.prompt_tokens,
            max_tokens = config.max_tokens,
            coding = config.coding_mode,
            "Starting benchmark"
        );

        let prompt = build_prompt(config);
        let request = GenerateRequest::completion(&config.model, &prompt, config.max_tokens);

        self.warmup(config, &request, &mut on_event)?;

        let results = self.measure(config, &request, &mut on_event);

        match summarize(&config.model, results, config.num_runs) {
            Ok(summary) => {
                on_event(BenchmarkEvent::Done {
                    summary: summary.clone(),
                });
                Ok(summary)
            }
            Err(BenchmarkError::NoSuccessfulRuns { attempted }) => {
                on_event(BenchmarkEvent::NoSuccessfulRuns { attempted });
                Err(BenchmarkError::NoSuccessfulRuns { attempted })
            }
            Err(e) => Err(e),
        }
    }

    fn warmup<F>(&self, config: &BenchmarkConfig, request: &GenerateRequest, on_event: &mut F) -> Result<()>
    where
        F: FnMut(BenchmarkEvent),
    {
        let timeout = warmup_timeout(config.prompt_tokens, config.max_tokens);
        info!(timeout_secs = timeout.as_secs_f64(), "Warmup run");
        on_event(BenchmarkEvent::WarmupStarted { timeout });

        if let Err(e) = self.backend.generate(request, timeout) {
            error!("Warmup failed: {}", e);
            on_event(BenchmarkEvent::WarmupFailed {
                message: e.to_string(),
            });
            return Err(BenchmarkError::WarmupFailed(e));
        }

        debug!("Warmup complete");
        on_event(BenchmarkEvent::WarmupComplete);
        Ok(())
    }

    fn measure<F>(&self, config: &BenchmarkConfig, request: &GenerateRequest, on_event: &mut F) -> Vec<RunResult>
    where
        F: FnMut(BenchmarkEvent),
    {
        let mut results = Vec::with_capacity(config.num_runs as usize);

        for run in 1..=config.num_runs {
            info!("Run {}/{}", run, config.num_runs);
            on_event(BenchmarkEvent::RunStarted {
                run,
                total: config.num_runs,
            });

            let start = Instant::now();
            let response = match self.backend.generate(request, MEASURED_RUN_TIMEOUT) {
                Ok(response) => response,
                Err(e) => {
                    warn!(run, "Run failed: {}", e);
                    on_event(BenchmarkEvent::RunFailed {
                        run,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let total_time = start.elapsed().as_secs_f64();

            let result = extract_run(run, &response, total_time);
            debug!(
                run,
                total_time,
                prompt_tps = result.prompt_tps,
                eval_tps = result.eval_tps,
                "Run complete"
            );
            on_event(BenchmarkEvent::RunComplete {
                result: result.clone(),
                requested_tokens: config.max_tokens,
            });
            results.push(result);
        }

        results
    }
}
