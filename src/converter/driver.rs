//! Batch driver — input enumeration, task dispatch, and run aggregation.

use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::naming;
use crate::types::{Event, InputFile, RunResult, TaskOutcome, TaskStatus, Verdict};

use super::BatchConverter;
use super::policy;
use super::task::{FileTaskContext, run_file_task};

impl BatchConverter {
    /// Resolve glob patterns into the concrete input file set.
    ///
    /// Matches are taken in pattern order. Overlapping patterns are NOT
    /// de-duplicated: each match becomes its own dispatched task, and the
    /// duplicate attempt then fails on the output collision. Directories
    /// matched by a pattern are skipped.
    pub fn resolve_inputs(&self, patterns: &[String]) -> Result<Vec<InputFile>> {
        let mut inputs = Vec::new();
        for pattern in patterns {
            for entry in glob::glob(pattern)? {
                let path = entry.map_err(|e| Error::Io(e.into_error()))?;
                if !path.is_file() {
                    continue;
                }
                let size = std::fs::metadata(&path).map(|m| m.len()).ok();
                tracing::info!(input = %path.display(), "Add input path");
                inputs.push(InputFile { path, size });
            }
        }
        Ok(inputs)
    }

    /// Run the batch: enumerate inputs, dispatch one task per input, and
    /// aggregate the verdict.
    ///
    /// An empty input set short-circuits to a trivial pass with zero tasks.
    /// Otherwise every task runs to a terminal state (success, failure,
    /// timeout, or cancellation) before the verdict is computed — the job
    /// fault policy is evaluated exactly once, after the batch fully drains.
    ///
    /// The returned `Ok(RunResult)` carries the pass/fail verdict; `Err` is
    /// reserved for failures that prevent the batch from starting at all
    /// (bad patterns, unreadable glob matches, output directory creation).
    pub async fn run(&self, patterns: &[String]) -> Result<RunResult> {
        let inputs = self.resolve_inputs(patterns)?;
        if inputs.is_empty() {
            tracing::info!("No input files to convert");
            self.emit_event(Event::RunFinished {
                total_tasks: 0,
                failed_tasks: 0,
                verdict: Verdict::Pass,
            });
            return Ok(RunResult {
                total_tasks: 0,
                failed_tasks: 0,
                verdict: Verdict::Pass,
                outcomes: Vec::new(),
            });
        }

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create output directory '{}': {}",
                        self.config.output_dir.display(),
                        e
                    ),
                ))
            })?;

        // A duplicate attempt races the original for the same create-only
        // output path, so speculative dispatch guarantees one collision
        // failure per input. Off unless the operator asked for it.
        let attempts: Vec<InputFile> = if self.config.speculative {
            inputs
                .iter()
                .flat_map(|input| [input.clone(), input.clone()])
                .collect()
        } else {
            inputs
        };

        let total_tasks = attempts.len();
        tracing::info!(
            total_tasks,
            output_dir = %self.config.output_dir.display(),
            soft = self.config.soft,
            failure_pct = self.config.failure_pct,
            "Dispatching conversion tasks"
        );

        let timeout = self.config.task_timeout();
        let outcomes: Vec<TaskOutcome> = stream::iter(attempts)
            .map(|input| {
                let ctx = FileTaskContext {
                    output: naming::output_path(&input.path, &self.config.output_dir),
                    input,
                    config: Arc::clone(&self.config),
                    extractor: Arc::clone(&self.extractor),
                    encoder: Arc::clone(&self.encoder),
                    event_tx: self.event_tx.clone(),
                };
                let cancel = self.cancel_token.child_token();
                async move { execute_attempt(ctx, timeout, cancel).await }
            })
            .buffer_unordered(self.config.max_concurrent_tasks)
            .collect()
            .await;

        let failed_tasks = outcomes.iter().filter(|o| o.is_failed()).count();
        let verdict = policy::evaluate(total_tasks, failed_tasks, self.config.failure_pct);

        match verdict {
            Verdict::Pass => tracing::info!(
                total_tasks,
                failed_tasks,
                "Run passed the failure threshold"
            ),
            Verdict::Fail => tracing::error!(
                total_tasks,
                failed_tasks,
                failure_pct = self.config.failure_pct,
                "Run failed: too many task failures"
            ),
        }
        self.emit_event(Event::RunFinished {
            total_tasks,
            failed_tasks,
            verdict,
        });

        Ok(RunResult {
            total_tasks,
            failed_tasks,
            verdict,
            outcomes,
        })
    }
}

/// Execute one dispatched attempt under the run's timeout and cancellation.
///
/// The task runs on its own spawned worker; a panic, timeout, or cancellation
/// resolves into a failed outcome rather than crossing the task boundary.
async fn execute_attempt(
    ctx: FileTaskContext,
    timeout: Duration,
    cancel: CancellationToken,
) -> TaskOutcome {
    let input = ctx.input.path.clone();
    let output = ctx.output.clone();
    let event_tx = ctx.event_tx.clone();
    let timeout_millis = timeout.as_millis() as u64;

    let mut handle = tokio::spawn(run_file_task(ctx));
    let outcome = tokio::select! {
        joined = tokio::time::timeout(timeout, &mut handle) => match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => failed_outcome(
                &input,
                &output,
                format!("task panicked: {}", join_err),
            ),
            Err(_elapsed) => {
                handle.abort();
                failed_outcome(
                    &input,
                    &output,
                    Error::Timeout {
                        path: input.clone(),
                        millis: timeout_millis,
                    }
                    .to_string(),
                )
            }
        },
        _ = cancel.cancelled() => {
            handle.abort();
            failed_outcome(
                &input,
                &output,
                Error::Cancelled {
                    path: input.clone(),
                }
                .to_string(),
            )
        }
    };

    match outcome.status {
        TaskStatus::Succeeded => event_tx
            .send(Event::TaskSucceeded {
                input: outcome.input.clone(),
                output: outcome.output.clone(),
                records_written: outcome.records_written,
                soft_error: outcome.error.clone(),
            })
            .ok(),
        TaskStatus::Failed => event_tx
            .send(Event::TaskFailed {
                input: outcome.input.clone(),
                error: outcome.error.clone().unwrap_or_default(),
            })
            .ok(),
    };
    outcome
}

/// Outcome for an attempt terminated from outside the task itself.
///
/// The worker never reported back, so the record count is unobservable here;
/// it is reported as zero regardless of what the partial output file holds.
fn failed_outcome(
    input: &std::path::Path,
    output: &std::path::Path,
    error: String,
) -> TaskOutcome {
    tracing::error!(input = %input.display(), error = %error, "Task terminated");
    TaskOutcome {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        status: TaskStatus::Failed,
        records_written: 0,
        error: Some(error),
    }
}
