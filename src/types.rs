//! Core types and events for wat-gen

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One archive container enumerated for conversion
///
/// Value object: enumerated once at run start, immutable for the run's
/// duration, never deleted by this system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    /// Location of the container on disk
    pub path: PathBuf,
    /// Size in bytes, when known (informational only — the conversion itself
    /// never consults it)
    pub size: Option<u64>,
}

impl InputFile {
    /// Create an input file entry for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: None,
        }
    }
}

/// Terminal status of one conversion task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The task wrote and finalized its output file
    Succeeded,
    /// The task failed; a partial output file may remain on disk
    Failed,
}

/// Final outcome of one conversion task
///
/// Finalized exactly once, when the task returns. A task tolerated by soft
/// mode reports `Succeeded` with `error` recording why the conversion
/// stopped short of the full container.
#[derive(Clone, Debug)]
pub struct TaskOutcome {
    /// The input container this task converted
    pub input: PathBuf,
    /// The output path this task attempted to create
    pub output: PathBuf,
    /// Terminal status
    pub status: TaskStatus,
    /// Number of metadata records written to the output
    ///
    /// For a task terminated from outside (timeout, cancellation, panic) the
    /// count is unobservable and reported as zero, even though a partial
    /// output file with some records may remain on disk.
    pub records_written: u64,
    /// Error that ended the task, if any
    ///
    /// Set for failed tasks. Also set on succeeded tasks when soft mode
    /// swallowed a processing error, in which case the output holds only the
    /// records extracted before the error.
    pub error: Option<String>,
}

impl TaskOutcome {
    /// True if this task failed.
    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    /// True if this task succeeded but converted only part of its input.
    pub fn is_partial(&self) -> bool {
        self.status == TaskStatus::Succeeded && self.error.is_some()
    }
}

/// Aggregate verdict for a batch run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The failed-task proportion stayed within the configured threshold
    Pass,
    /// Too many tasks failed relative to the configured threshold
    Fail,
}

/// Aggregate outcome of a batch run
///
/// Computed exactly once, after every task has finished or been terminated.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Total number of tasks dispatched (zero when no input matched)
    pub total_tasks: usize,
    /// Number of tasks that ended in [`TaskStatus::Failed`]
    pub failed_tasks: usize,
    /// Pass/fail verdict from the job fault policy
    pub verdict: Verdict,
    /// Per-task outcomes, in completion order
    pub outcomes: Vec<TaskOutcome>,
}

impl RunResult {
    /// True if the run passed the job fault policy.
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Total metadata records written across all tasks.
    pub fn records_written(&self) -> u64 {
        self.outcomes.iter().map(|o| o.records_written).sum()
    }
}

/// Events emitted during a batch run
///
/// Consumers subscribe via [`BatchConverter::subscribe`](crate::BatchConverter::subscribe);
/// no polling required. Events are best-effort: send failures when nobody is
/// listening are ignored.
#[derive(Clone, Debug)]
pub enum Event {
    /// A conversion task began processing its input
    TaskStarted {
        /// The input container being converted
        input: PathBuf,
    },
    /// A conversion task finished and finalized its output
    TaskSucceeded {
        /// The input container that was converted
        input: PathBuf,
        /// The output file that was created
        output: PathBuf,
        /// Number of metadata records written
        records_written: u64,
        /// Soft-mode error that cut the conversion short, if any
        soft_error: Option<String>,
    },
    /// A conversion task failed
    TaskFailed {
        /// The input container whose conversion failed
        input: PathBuf,
        /// Description of the failure
        error: String,
    },
    /// The batch drained and the verdict was computed
    RunFinished {
        /// Total tasks dispatched
        total_tasks: usize,
        /// Tasks that failed
        failed_tasks: usize,
        /// Aggregate verdict
        verdict: Verdict,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: TaskStatus, error: Option<&str>) -> TaskOutcome {
        TaskOutcome {
            input: PathBuf::from("a.warc.gz"),
            output: PathBuf::from("a.wat.gz"),
            status,
            records_written: 3,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_partial_outcome_requires_success_and_error() {
        assert!(outcome(TaskStatus::Succeeded, Some("bad record")).is_partial());
        assert!(!outcome(TaskStatus::Succeeded, None).is_partial());
        assert!(!outcome(TaskStatus::Failed, Some("bad record")).is_partial());
    }

    #[test]
    fn test_run_result_records_written_sums_outcomes() {
        let result = RunResult {
            total_tasks: 2,
            failed_tasks: 0,
            verdict: Verdict::Pass,
            outcomes: vec![
                outcome(TaskStatus::Succeeded, None),
                outcome(TaskStatus::Succeeded, None),
            ],
        };
        assert_eq!(result.records_written(), 6);
        assert!(result.passed());
    }
}
