mod report;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ollabench_benchmark::{assess, BenchmarkRunner, StreamingRunner, STREAMING_PROMPT};
use ollabench_core::{BenchmarkConfig, OllaBenchSettings, StreamConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ollabench")]
#[command(about = "Ollabench - prompt and generation throughput benchmark for Ollama", long_about = None)]
struct Cli {
    /// Ollama base URL
    #[arg(long, env = "OLLAMA_HOST", global = true)]
    ollama_host: Option<String>,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Warmup plus measured runs, averaged and rated
    Bench {
        /// Model to benchmark (e.g. gpt-oss:20b)
        model: String,

        /// Approximate prompt length in tokens [default: 128]
        prompt_tokens: Option<u32>,

        /// Tokens to generate per run [default: 128]
        max_tokens: Option<u32>,

        /// Number of measured runs [default: 3]
        runs: Option<u32>,

        /// Use the code-generation prompt template
        #[arg(long)]
        coding: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Single streamed generation, rate measured from the first token
    Stream {
        /// Model to stream from
        model: String,

        /// Tokens to generate [default: 10000]
        #[arg(short, long)]
        max_tokens: Option<u32>,

        /// Prompt text (defaults to a large coding prompt)
        #[arg(short, long)]
        prompt: Option<String>,

        #[arg(short, long)]
        temperature: Option<f32>,

        #[arg(long)]
        top_p: Option<f32>,

        /// Do not echo streamed text
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => OllaBenchSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => OllaBenchSettings::default(),
    };
    let host = resolve_host(cli.ollama_host.as_deref(), &settings);
    tracing::debug!(host = %host, "Resolved Ollama host");

    match cli.command {
        Commands::Bench {
            model,
            prompt_tokens,
            max_tokens,
            runs,
            coding,
            output,
        } => {
            let defaults = &settings.defaults;
            let config = BenchmarkConfig::new(model)
                .with_prompt_tokens(prompt_tokens.unwrap_or(defaults.prompt_tokens))
                .with_max_tokens(max_tokens.unwrap_or(defaults.max_tokens))
                .with_num_runs(runs.unwrap_or(defaults.num_runs))
                .with_coding_mode(coding);
            cmd_bench(&host, &config, output)
        }
        Commands::Stream {
            model,
            max_tokens,
            prompt,
            temperature,
            top_p,
            quiet,
        } => {
            let defaults = &settings.defaults;
            let config = StreamConfig::new(model, prompt.unwrap_or_else(|| STREAMING_PROMPT.to_string()))
                .with_max_tokens(max_tokens.unwrap_or(defaults.stream_max_tokens))
                .with_sampling(
                    temperature.unwrap_or(defaults.temperature),
                    top_p.unwrap_or(defaults.top_p),
                );
            cmd_stream(&host, &config, quiet)
        }
    }
}

/// Flag or `OLLAMA_HOST` first, then the settings file. A bare `host:port`
/// (the form Ollama itself accepts) gets an `http://` scheme.
fn resolve_host(flag: Option<&str>, settings: &OllaBenchSettings) -> String {
    let host = flag
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or(settings.ollama.host.as_str());

    if host.contains("://") {
        return host.to_string();
    }
    format!("http://{}", host)
}

fn cmd_bench(host: &str, config: &BenchmarkConfig, output: OutputFormat) -> Result<()> {
    let runner = BenchmarkRunner::new(host);

    let summary = match output {
        OutputFormat::Table => {
            report::print_bench_header(config);
            runner.run_with_events(config, |event| report::print_event(config, &event))?
        }
        OutputFormat::Json => runner.run(config)?,
    };

    let assessment = assess(&summary);
    match output {
        OutputFormat::Table => report::print_summary(&summary, &assessment),
        OutputFormat::Json => println!("{}", report::summary_json(&summary, &assessment)?),
    }

    Ok(())
}

fn cmd_stream(host: &str, config: &StreamConfig, quiet: bool) -> Result<()> {
    let runner = StreamingRunner::new(host);
    report::print_stream_header(config);

    let mut stdout = io::stdout();
    let result = runner.run_with_observer(config, |text| {
        if quiet {
            return;
        }
        let _ = write!(stdout, "{}", text);
        let _ = stdout.flush();
    })?;

    report::print_stream_result(&result);
    Ok(())
}
