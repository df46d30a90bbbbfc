//! Fault policies
//!
//! Two decision points, each evaluated in exactly one place:
//!
//! - the task-level policy decides whether a single error aborts its task or
//!   is swallowed under soft mode, classified once from the error kind rather
//!   than caught and re-thrown at multiple call sites;
//! - the job-level policy turns the final failed-task count into the run's
//!   pass/fail verdict, after the batch has fully drained.

use crate::error::Error;
use crate::types::Verdict;

/// What a task does with a classified error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultAction {
    /// The error is fatal; the task transitions to failed
    AbortTask,
    /// Soft mode tolerates the error; the task keeps its partial output and
    /// reports success
    Swallow,
}

/// Classify one task-local error.
///
/// Open-phase errors always abort: they mean the task could not even begin,
/// and soft mode never masks them. Processing-phase errors are swallowed iff
/// soft mode is enabled — a single malformed record deep inside an
/// otherwise-huge container should not discard the correctly-converted prefix
/// when the operator prefers graceful degradation.
pub fn classify(error: &Error, soft: bool) -> FaultAction {
    if soft && error.is_processing() {
        FaultAction::Swallow
    } else {
        FaultAction::AbortTask
    }
}

/// Compute the run verdict from the final task counts.
///
/// Fails iff any tasks ran and the failed proportion exceeds the configured
/// percentage threshold. The zero-task run passes: no input is success, not
/// an all-tasks-failed degenerate case.
pub fn evaluate(total_tasks: usize, failed_tasks: usize, failure_pct: u8) -> Verdict {
    // failed/total*100 > pct, kept in integer arithmetic
    if total_tasks > 0 && failed_tasks * 100 > failure_pct as usize * total_tasks {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}
