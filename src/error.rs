//! Error types for wat-gen
//!
//! The error taxonomy mirrors the phases of a conversion task so that fault
//! classification can be done once, from the error kind alone:
//! - Configuration errors abort the run before any task is dispatched
//! - Open-phase errors (`InputOpen`, `OutputOpen`, `OutputExists`) abort the
//!   owning task unconditionally
//! - Processing-phase errors (`Extract`, `Encode`) are tolerated in soft mode

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wat-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wat-gen
///
/// Each variant carries the context needed to log a useful per-task failure:
/// the failing file's path and, for processing errors, how many records had
/// already been written when the error occurred.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// Failed to open an input container for reading
    #[error("failed to open input {path}: {source}")]
    InputOpen {
        /// The input file that could not be opened
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Failed to create an output container
    #[error("failed to create output {path}: {source}")]
    OutputOpen {
        /// The output file that could not be created
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Output file already exists
    ///
    /// Output creation is create-only, so this is the collision signal raised
    /// when two attempts at the same input race for the same output path.
    #[error("output already exists: {path}")]
    OutputExists {
        /// The output path that was already present
        path: PathBuf,
    },

    /// Record extraction failed mid-stream (decode error in the input)
    #[error("extraction failed for {path} after {records} records: {message}")]
    Extract {
        /// The input file whose record stream failed
        path: PathBuf,
        /// Number of records successfully extracted before the failure
        records: u64,
        /// Description of the decode failure
        message: String,
    },

    /// Metadata encoding failed mid-stream (write error on the output)
    #[error("encoding failed for {path} after {records} records: {message}")]
    Encode {
        /// The output file whose record sink failed
        path: PathBuf,
        /// Number of records successfully written before the failure
        records: u64,
        /// Description of the encode failure
        message: String,
    },

    /// Task exceeded its configured wall-clock timeout
    #[error("task for {path} timed out after {millis} ms")]
    Timeout {
        /// The input file whose task was terminated
        path: PathBuf,
        /// The configured timeout in milliseconds
        millis: u64,
    },

    /// Task was cancelled before completing
    #[error("task for {path} was cancelled")]
    Cancelled {
        /// The input file whose task was cancelled
        path: PathBuf,
    },

    /// Invalid glob pattern in the input set
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// I/O error outside any specific task phase
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True if this error belongs to the processing phase of a task
    /// (record extraction or encoding), as opposed to the open phase.
    ///
    /// Only processing-phase errors are eligible for soft-mode tolerance.
    pub fn is_processing(&self) -> bool {
        matches!(self, Error::Extract { .. } | Error::Encode { .. })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_output_exists_message_names_path() {
        let err = Error::OutputExists {
            path: Path::new("/out/crawl.wat.gz").to_path_buf(),
        };
        assert_eq!(err.to_string(), "output already exists: /out/crawl.wat.gz");
    }

    #[test]
    fn test_extract_is_processing_phase() {
        let err = Error::Extract {
            path: Path::new("a.warc.gz").to_path_buf(),
            records: 2,
            message: "truncated record header".to_string(),
        };
        assert!(err.is_processing());
    }

    #[test]
    fn test_open_errors_are_not_processing_phase() {
        let input = Error::InputOpen {
            path: Path::new("a.warc.gz").to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let exists = Error::OutputExists {
            path: Path::new("a.wat.gz").to_path_buf(),
        };
        assert!(!input.is_processing());
        assert!(!exists.is_processing());
    }

    #[test]
    fn test_config_error_message() {
        let err = Error::Config {
            message: "output directory must not be empty".to_string(),
            key: Some("output_dir".to_string()),
        };
        assert!(err.to_string().contains("output directory"));
    }
}
