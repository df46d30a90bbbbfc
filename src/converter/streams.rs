//! Stream acquisition for conversion tasks
//!
//! One task owns exactly one input handle and one output handle, for its own
//! lifetime only. Handles are released on every exit path by dropping; the
//! encoder's `close` performs the explicit flush on the success path.
//!
//! Output creation is create-only. The filesystem's create-new atomicity is
//! the only cross-task coordination point in the whole system: two attempts
//! racing for the same output path resolve into one winner and one
//! [`Error::OutputExists`] collision.

use std::path::Path;
use tokio::fs::{File, OpenOptions};

use crate::error::{Error, Result};

/// Open an input container for reading.
///
/// Any failure is fatal to the owning task; there is no retry here.
pub(crate) async fn open_input(path: &Path) -> Result<File> {
    File::open(path).await.map_err(|e| Error::InputOpen {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create an output container, failing if the path already exists.
///
/// Never deletes or truncates an existing file — a collision simply refuses
/// to start.
pub(crate) async fn open_output(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                Error::OutputExists {
                    path: path.to_path_buf(),
                }
            } else {
                Error::OutputOpen {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_input_missing_file_is_input_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_input(&dir.path().join("absent.warc.gz"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InputOpen { .. }));
    }

    #[tokio::test]
    async fn test_open_output_creates_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.wat.gz");
        open_output(&path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_open_output_collision_is_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.wat.gz");
        open_output(&path).await.unwrap();

        let err = open_output(&path).await.unwrap_err();
        match err {
            Error::OutputExists { path: p } => assert_eq!(p, path),
            other => panic!("expected OutputExists, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_output_never_truncates_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.wat.gz");
        tokio::fs::write(&path, b"earlier attempt").await.unwrap();

        assert!(open_output(&path).await.is_err());
        let content = tokio::fs::read(&path).await.unwrap();
        assert_eq!(content, b"earlier attempt");
    }
}
