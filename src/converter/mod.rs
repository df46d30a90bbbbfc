//! Batch conversion core split into focused submodules.
//!
//! The `BatchConverter` struct and its methods are organized by domain:
//! - [`driver`] - Input enumeration, task dispatch, and run aggregation
//! - [`task`] - Core conversion execution for one input file
//! - [`streams`] - Input/output stream acquisition
//! - [`policy`] - Task-level and job-level fault policies

mod driver;
pub(crate) mod policy;
mod streams;
mod task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use crate::config::RunConfig;
use crate::error::Result;
use crate::pipeline::{RecordEncoder, RecordExtractor};
use crate::types::Event;

/// Main batch converter instance (cloneable - all fields are cheaply shared)
///
/// Binds one run configuration to the extraction pipeline and encoder
/// collaborators, dispatches one conversion task per enumerated input file,
/// and aggregates the run verdict. Tasks never communicate with each other;
/// the only cross-task coordination is the create-only semantics of the
/// output paths themselves.
#[derive(Clone)]
pub struct BatchConverter {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<RunConfig>,
    /// Record extraction collaborator, driven as a black box
    pub(crate) extractor: Arc<dyn RecordExtractor>,
    /// Record encoding collaborator, driven as a black box
    pub(crate) encoder: Arc<dyn RecordEncoder>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Run-level cancellation, fanned out to every task as a child token
    pub(crate) cancel_token: tokio_util::sync::CancellationToken,
}

impl BatchConverter {
    /// Create a new converter for one batch run.
    ///
    /// Validates the configuration up front so that bad settings surface as
    /// configuration errors before any task is dispatched.
    pub fn new(
        config: RunConfig,
        extractor: Arc<dyn RecordExtractor>,
        encoder: Arc<dyn RecordEncoder>,
    ) -> Result<Self> {
        config.validate()?;

        // Buffered so slow subscribers don't stall conversion
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            config: Arc::new(config),
            extractor,
            encoder,
            event_tx,
            cancel_token: tokio_util::sync::CancellationToken::new(),
        })
    }

    /// Subscribe to run events.
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. A subscriber falling behind by more than the channel
    /// buffer observes a `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the run configuration.
    pub fn get_config(&self) -> Arc<RunConfig> {
        Arc::clone(&self.config)
    }

    /// Cancel the run.
    ///
    /// Still-running tasks are terminated and counted as failed; they may
    /// leave partial, unflushed output files behind. No cleanup is attempted.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Emit an event to all subscribers.
    ///
    /// If nobody is listening the event is silently dropped; conversion never
    /// depends on a subscriber being present.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
