//! Command-line driver for wat-gen.
//!
//! Exit codes: `0` when the run passes (including the no-input case), `1`
//! when too many tasks failed, `2` for usage or configuration errors raised
//! before any task is dispatched.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wat_gen::{BatchConverter, JsonLinesEncoder, JsonLinesExtractor, RunConfig, run_with_shutdown};

/// Generate WAT metadata files from WARC/ARC web archive files.
#[derive(Parser, Debug)]
#[command(name = "wat-gen", version, about)]
struct Args {
    /// Directory that receives the generated WAT files
    output_dir: PathBuf,

    /// Input file patterns (shell-style globs), one task per match
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Tolerate mid-file processing errors, keeping each file's converted prefix
    #[arg(long)]
    soft: bool,

    /// Per-task timeout in milliseconds
    #[arg(long, value_name = "MILLIS", default_value_t = 72_000_000)]
    timeout: u64,

    /// Percentage of failed tasks the run tolerates (e.g. 10 allows 10%)
    #[arg(long, value_name = "PCT", default_value_t = 0)]
    failpct: u8,

    /// Maximum number of files converted concurrently
    #[arg(long, value_name = "N", default_value_t = 4)]
    concurrency: usize,

    /// Dispatch a duplicate attempt per input (the duplicate fails on the
    /// output collision; useful only for exercising collision handling)
    #[arg(long, hide = true)]
    speculative: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = RunConfig {
        output_dir: args.output_dir,
        task_timeout_millis: args.timeout,
        soft: args.soft,
        failure_pct: args.failpct,
        max_concurrent_tasks: args.concurrency,
        speculative: args.speculative,
    };

    let converter = match BatchConverter::new(
        config,
        Arc::new(JsonLinesExtractor),
        Arc::new(JsonLinesEncoder),
    ) {
        Ok(converter) => converter,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    match run_with_shutdown(converter, &args.patterns).await {
        Ok(result) => {
            println!(
                "{} tasks, {} failed, {} records written: {}",
                result.total_tasks,
                result.failed_tasks,
                result.records_written(),
                if result.passed() { "PASS" } else { "FAIL" },
            );
            if result.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted before completing");
            ExitCode::from(2)
        }
    }
}
