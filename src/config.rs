//! Run configuration for wat-gen

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for one batch run
///
/// Built once before any task is dispatched and shared read-only by every
/// task for the run's duration. Tasks never mutate it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory that receives every generated WAT file
    pub output_dir: PathBuf,

    /// Per-task wall-clock timeout in milliseconds (default: 72,000,000 ≈ 20 hours)
    ///
    /// A task exceeding this is forcibly terminated and counted as failed.
    #[serde(default = "default_task_timeout_millis")]
    pub task_timeout_millis: u64,

    /// Soft mode — tolerate mid-file processing errors (default: false)
    ///
    /// When enabled, a decode or encode failure deep inside an otherwise-good
    /// container keeps the records written so far instead of failing the task.
    /// Open-phase errors are never tolerated.
    #[serde(default)]
    pub soft: bool,

    /// Maximum percentage of failed tasks the run tolerates (default: 0)
    ///
    /// With the default, any single task failure fails the whole run.
    #[serde(default)]
    pub failure_pct: u8,

    /// Maximum number of conversion tasks running concurrently (default: 4)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_tasks: usize,

    /// Dispatch a duplicate attempt for every input (default: false)
    ///
    /// Outputs are create-only, so a duplicate attempt is not harmless retried
    /// work: exactly one attempt wins the create and the other fails with a
    /// collision. Left disabled unless collisions are the point (e.g. tests).
    #[serde(default)]
    pub speculative: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::new(),
            task_timeout_millis: default_task_timeout_millis(),
            soft: false,
            failure_pct: 0,
            max_concurrent_tasks: default_max_concurrent(),
            speculative: false,
        }
    }
}

impl RunConfig {
    /// Create a configuration with defaults for the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// The per-task timeout as a [`Duration`].
    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_millis)
    }

    /// Validate the configuration before any task starts.
    ///
    /// Checks that would otherwise surface mid-run as confusing task failures
    /// are rejected up front as configuration errors.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "output directory must not be empty".to_string(),
                key: Some("output_dir".to_string()),
            });
        }
        if self.failure_pct > 100 {
            return Err(Error::Config {
                message: format!(
                    "failure percentage must be 0-100, got {}",
                    self.failure_pct
                ),
                key: Some("failure_pct".to_string()),
            });
        }
        if self.max_concurrent_tasks == 0 {
            return Err(Error::Config {
                message: "max_concurrent_tasks must be at least 1".to_string(),
                key: Some("max_concurrent_tasks".to_string()),
            });
        }
        if self.task_timeout_millis == 0 {
            return Err(Error::Config {
                message: "task timeout must be at least 1 ms".to_string(),
                key: Some("task_timeout_millis".to_string()),
            });
        }
        Ok(())
    }
}

fn default_task_timeout_millis() -> u64 {
    // 20 hours, matching the historical batch default
    72_000_000
}

fn default_max_concurrent() -> usize {
    4
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_20_hour_timeout() {
        let config = RunConfig::new("/out");
        assert_eq!(config.task_timeout_millis, 72_000_000);
        assert_eq!(config.task_timeout(), Duration::from_millis(72_000_000));
    }

    #[test]
    fn test_default_config_is_strict() {
        let config = RunConfig::new("/out");
        assert!(!config.soft);
        assert_eq!(config.failure_pct, 0);
        assert!(!config.speculative);
    }

    #[test]
    fn test_validate_accepts_defaults_with_output_dir() {
        assert!(RunConfig::new("/out").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_output_dir() {
        let config = RunConfig::default();
        let err = config.validate().unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("output_dir")),
            other => panic!("expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_failure_pct_over_100() {
        let config = RunConfig {
            failure_pct: 101,
            ..RunConfig::new("/out")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = RunConfig {
            max_concurrent_tasks: 0,
            ..RunConfig::new("/out")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = RunConfig {
            task_timeout_millis: 0,
            ..RunConfig::new("/out")
        };
        let err = config.validate().unwrap_err();
        match err {
            Error::Config { key, .. } => {
                assert_eq!(key.as_deref(), Some("task_timeout_millis"))
            }
            other => panic!("expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_config_survives_serde_round_trip() {
        let config = RunConfig {
            soft: true,
            failure_pct: 10,
            ..RunConfig::new("/out")
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RunConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.soft);
        assert_eq!(parsed.failure_pct, 10);
        assert_eq!(parsed.output_dir, PathBuf::from("/out"));
    }
}
