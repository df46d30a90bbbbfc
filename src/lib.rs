//! # wat-gen
//!
//! Batch generator of WAT metadata containers from WARC/ARC web archive
//! files.
//!
//! ## Design Philosophy
//!
//! wat-gen is designed to be:
//! - **Embarrassingly parallel** - One independent task per input file, no
//!   cross-task state, no merge phase
//! - **Fault-contained** - Task failures never cross task boundaries; the run
//!   verdict is a single policy decision over the final failure count
//! - **Format-agnostic at the core** - Container decoding and metadata
//!   serialization plug in through trait boundaries
//! - **Event-driven** - Consumers subscribe to run events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wat_gen::{BatchConverter, JsonLinesEncoder, JsonLinesExtractor, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig {
//!         soft: true,
//!         ..RunConfig::new("/data/wat")
//!     };
//!
//!     let converter = BatchConverter::new(
//!         config,
//!         Arc::new(JsonLinesExtractor),
//!         Arc::new(JsonLinesEncoder),
//!     )?;
//!
//!     let result = converter.run(&["/data/crawls/*.warc.gz".to_string()]).await?;
//!     println!(
//!         "{} tasks, {} failed, passed: {}",
//!         result.total_tasks,
//!         result.failed_tasks,
//!         result.passed()
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Run configuration
pub mod config;
/// Core batch converter implementation (decomposed into focused submodules)
pub mod converter;
/// Error types
pub mod error;
/// Output file naming
pub mod naming;
/// Extraction pipeline and encoder trait boundaries
pub mod pipeline;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::RunConfig;
pub use converter::BatchConverter;
pub use error::{Error, Result};
pub use pipeline::{
    JsonLinesEncoder, JsonLinesExtractor, MetadataRecord, RecordEncoder, RecordExtractor,
    RecordSink, RecordStream,
};
pub use types::{Event, InputFile, RunResult, TaskOutcome, TaskStatus, Verdict};

/// Run a batch with graceful signal handling.
///
/// Races the batch against a termination signal: on SIGTERM/SIGINT the
/// converter is cancelled, in-flight tasks are terminated and counted as
/// failed, and the drained [`RunResult`] is still returned.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(
    converter: BatchConverter,
    patterns: &[String],
) -> Result<RunResult> {
    let signal_converter = converter.clone();
    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        tracing::warn!("Termination signal received, cancelling remaining tasks");
        signal_converter.cancel();
    });

    let result = converter.run(patterns).await;
    signal_task.abort();
    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
