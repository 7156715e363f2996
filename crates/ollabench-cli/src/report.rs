//! Human-readable output for the `bench` and `stream` commands.

use ollabench_benchmark::{eval_band, prompt_band, Assessment, BenchmarkEvent};
use ollabench_core::{BenchmarkConfig, BenchmarkSummary, RunResult, StreamConfig, StreamingResult, Tier};
use serde::Serialize;

/// Requests above this size get timing hints.
const LARGE_REQUEST_TOKENS: u32 = 1000;
/// Generation rate used for the "expected duration" hint.
const EXPECTED_GEN_TPS: f64 = 24.0;

pub fn print_bench_header(config: &BenchmarkConfig) {
    println!("🚀 Benchmarking {}", config.model);
    println!("   Prompt: ~{} tokens", config.prompt_tokens);
    println!("   Generation: ~{} tokens", config.max_tokens);
    println!("   Runs: {}", config.num_runs);
    if config.coding_mode {
        println!("   Mode: Coding Test");
    }
    println!();
}

pub fn print_event(config: &BenchmarkConfig, event: &BenchmarkEvent) {
    let large = config.max_tokens > LARGE_REQUEST_TOKENS;

    match event {
        BenchmarkEvent::WarmupStarted { timeout } => {
            println!("🔥 Warmup run...");
            if large {
                println!("   ⏱️  Warmup timeout: {:.0}s", timeout.as_secs_f64());
            }
        }
        BenchmarkEvent::WarmupComplete => {
            println!("✅ Warmup complete");
            println!();
        }
        BenchmarkEvent::WarmupFailed { message } => {
            println!("❌ Warmup failed: {}", message);
        }
        BenchmarkEvent::RunStarted { run, total } => {
            println!("📊 Run {}/{}...", run, total);
            if large {
                println!(
                    "   ⏱️  This may take several minutes (~{:.0}s expected)...",
                    f64::from(config.max_tokens) / EXPECTED_GEN_TPS
                );
            }
        }
        BenchmarkEvent::RunComplete {
            result,
            requested_tokens,
        } => print_run(result, *requested_tokens),
        BenchmarkEvent::RunFailed { run, message } => {
            println!("❌ Run {} failed: {}", run, message);
        }
        BenchmarkEvent::Done { summary } => {
            if summary.failed_runs() > 0 {
                println!(
                    "⚠️  {} runs failed, using {} successful runs",
                    summary.failed_runs(),
                    summary.successful_runs
                );
            }
        }
        BenchmarkEvent::NoSuccessfulRuns { .. } => {
            println!();
            println!("❌ No successful runs");
        }
    }
}

fn print_run(result: &RunResult, requested_tokens: u32) {
    let generated_pct = if requested_tokens > 0 {
        result.eval_count as f64 / f64::from(requested_tokens) * 100.0
    } else {
        0.0
    };

    println!(
        "   ⏱️  Total: {:.2}s | Prompt: {:.1} t/s | Gen: {:.1} t/s",
        result.total_time, result.prompt_tps, result.eval_tps
    );
    println!(
        "   📊 Tokens: {} prompt, {}/{} generated ({:.1}%)",
        result.prompt_eval_count, result.eval_count, requested_tokens, generated_pct
    );
}

pub fn print_summary(summary: &BenchmarkSummary, assessment: &Assessment) {
    println!();
    println!("{:=<60}", "");
    println!("📈 RESULTS");
    println!("{:=<60}", "");

    println!();
    println!("📊 Average Performance ({} runs):", summary.successful_runs);
    println!("   Prompt Processing: {:.1} tokens/second", summary.avg_prompt_tps);
    println!("   Token Generation:  {:.1} tokens/second", summary.avg_eval_tps);
    println!("   Total Time:        {:.2} seconds", summary.avg_total_time);

    println!();
    println!("📊 Performance Assessment:");
    println!(
        "   {} Prompt: {} ({})",
        tier_icon(assessment.prompt),
        assessment.prompt.label().to_uppercase(),
        prompt_band(assessment.prompt)
    );
    println!(
        "   {} Generation: {} ({})",
        tier_icon(assessment.generation),
        assessment.generation.label().to_uppercase(),
        eval_band(assessment.generation)
    );
    println!();
}

fn tier_icon(tier: Tier) -> &'static str {
    if tier.is_acceptable() {
        "✅"
    } else if tier == Tier::Fair {
        "⚠️ "
    } else {
        "❌"
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: &'a BenchmarkSummary,
    assessment: &'a Assessment,
}

pub fn summary_json(summary: &BenchmarkSummary, assessment: &Assessment) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        summary,
        assessment,
    })
}

pub fn print_stream_header(config: &StreamConfig) {
    println!("🚀 Testing streaming generation with {}", config.model);
    println!("   Max tokens: {}", config.max_tokens);
    println!("   Prompt length: {} characters", config.prompt.chars().count());
    println!();
    println!("📝 Streaming output...");
    println!("{:-<60}", "");
}

pub fn print_stream_result(result: &StreamingResult) {
    println!();
    println!("{:-<60}", "");
    println!();
    println!("📊 Results:");
    println!("   Tokens generated: {} / {}", result.tokens, result.max_tokens);
    println!("   Characters: {}", result.chars);
    println!("   Time: {:.2}s", result.elapsed_secs);
    println!("   Speed: {:.2} tokens/second", result.tokens_per_sec);
    if !result.done {
        println!("   ⚠️  Stream ended without a done marker");
    }
}
