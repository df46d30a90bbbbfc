//! Conversion task — full lifecycle for one input container.
//!
//! A task is a pure function of (input file, run configuration): no state
//! survives across tasks, so nothing can leak between unrelated files on the
//! same worker. The lifecycle is a straight line — open input, create output,
//! drive the record loop, finalize — with the two terminal states success and
//! failure. There is no retry-in-place; a retry, if any, is a fresh task.

use std::sync::Arc;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::pipeline::{RecordEncoder, RecordExtractor};
use crate::types::{Event, InputFile, TaskOutcome, TaskStatus};

use super::policy::{self, FaultAction};
use super::streams;

/// Everything one conversion task needs, bound at dispatch time.
pub(crate) struct FileTaskContext {
    /// The input container to convert
    pub(crate) input: InputFile,
    /// The output location, computed deterministically before dispatch
    pub(crate) output: std::path::PathBuf,
    /// Shared read-only run configuration
    pub(crate) config: Arc<RunConfig>,
    /// Record extraction collaborator
    pub(crate) extractor: Arc<dyn RecordExtractor>,
    /// Record encoding collaborator
    pub(crate) encoder: Arc<dyn RecordEncoder>,
    /// Event broadcast channel
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

/// Run one conversion task to its terminal state.
///
/// Phases:
/// 1. Open the input stream (any error is fatal to the task)
/// 2. Create the output stream, create-only (any error, including a
///    collision, is fatal; an existing file is never touched)
/// 3. Pull records from the extractor and push them to the encoder until
///    end-of-input
/// 4. Close the sink, flushing and finalizing the container
///
/// Errors from phase 3-4 go through the task fault policy exactly once. A
/// failed task leaves whatever partial output it had written — an accepted
/// trade-off, not hidden.
pub(crate) async fn run_file_task(ctx: FileTaskContext) -> TaskOutcome {
    let input_path = ctx.input.path.clone();
    tracing::info!(input = %input_path.display(), "Start");
    ctx.event_tx
        .send(Event::TaskStarted {
            input: input_path.clone(),
        })
        .ok();

    let outcome = match convert_file(&ctx).await {
        Ok((records_written, soft_error)) => {
            if let Some(ref reason) = soft_error {
                tracing::warn!(
                    input = %input_path.display(),
                    records_written,
                    error = %reason,
                    "Converted partially, error tolerated by soft mode"
                );
            }
            TaskOutcome {
                input: input_path.clone(),
                output: ctx.output.clone(),
                status: TaskStatus::Succeeded,
                records_written,
                error: soft_error,
            }
        }
        Err(e) => {
            tracing::error!(input = %input_path.display(), error = %e, "Error processing file");
            // Processing errors know how many records made it out before the
            // failure; the partial file on disk holds that many.
            let records_written = match &e {
                Error::Extract { records, .. } | Error::Encode { records, .. } => *records,
                _ => 0,
            };
            TaskOutcome {
                input: input_path.clone(),
                output: ctx.output.clone(),
                status: TaskStatus::Failed,
                records_written,
                error: Some(e.to_string()),
            }
        }
    };

    tracing::info!(input = %input_path.display(), "Finish");
    outcome
}

/// Convert one container, returning the record count and the soft-tolerated
/// error, if one was swallowed.
async fn convert_file(ctx: &FileTaskContext) -> Result<(u64, Option<String>)> {
    // Open phase: both failures abort unconditionally, soft mode or not.
    let input_stream = streams::open_input(&ctx.input.path).await?;
    let output_stream = streams::open_output(&ctx.output).await?;

    let mut records_written = 0u64;
    let driven = drive_records(ctx, input_stream, output_stream, &mut records_written).await;

    match driven {
        Ok(()) => Ok((records_written, None)),
        Err(err) => match policy::classify(&err, ctx.config.soft) {
            FaultAction::AbortTask => Err(err),
            FaultAction::Swallow => Ok((records_written, Some(err.to_string()))),
        },
    }
}

/// The record loop: pull from the extractor, push to the encoder, until the
/// extractor signals end-of-input.
///
/// The sink is closed on every path so the converted prefix is flushed even
/// when the loop stops on an error; a close failure is only surfaced when the
/// loop itself completed.
async fn drive_records(
    ctx: &FileTaskContext,
    input_stream: tokio::fs::File,
    output_stream: tokio::fs::File,
    records_written: &mut u64,
) -> Result<()> {
    let mut records = ctx
        .extractor
        .open(Box::new(input_stream))
        .await
        .map_err(|e| extract_error(ctx, *records_written, e))?;
    let mut sink = ctx
        .encoder
        .open(Box::new(output_stream))
        .await
        .map_err(|e| encode_error(ctx, *records_written, e))?;

    let mut failure: Option<Error> = None;
    loop {
        let record = match records.next_record().await {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(e) => {
                failure = Some(extract_error(ctx, *records_written, e));
                break;
            }
        };
        if let Err(e) = sink.write_record(&record).await {
            failure = Some(encode_error(ctx, *records_written, e));
            break;
        }
        *records_written += 1;
    }

    let closed = sink.close().await;
    if let Some(err) = failure {
        return Err(err);
    }
    closed.map_err(|e| encode_error(ctx, *records_written, e))
}

fn extract_error(ctx: &FileTaskContext, records: u64, source: Error) -> Error {
    Error::Extract {
        path: ctx.input.path.clone(),
        records,
        message: source.to_string(),
    }
}

fn encode_error(ctx: &FileTaskContext, records: u64, source: Error) -> Error {
    Error::Encode {
        path: ctx.output.clone(),
        records,
        message: source.to_string(),
    }
}
