//! Shared helpers for converter unit tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::pipeline::{
    InputStream, JsonLinesEncoder, JsonLinesExtractor, MetadataRecord, OutputStream,
    RecordEncoder, RecordExtractor, RecordSink, RecordStream,
};

use super::BatchConverter;

/// A tiny valid metadata envelope for fixture files.
pub(crate) fn envelope_line(uri: &str) -> String {
    format!(
        r#"{{"Envelope":{{"WARC-Header-Metadata":{{"WARC-Target-URI":"{}"}}}}}}"#,
        uri
    )
}

/// Write a newline-delimited envelope fixture with `good` valid records and,
/// optionally, a malformed line at the given 1-based record position.
pub(crate) fn write_fixture(
    dir: &Path,
    name: &str,
    good: usize,
    malformed_at: Option<usize>,
) -> PathBuf {
    let mut lines = Vec::new();
    let mut written = 0;
    let mut position = 0;
    while written < good || malformed_at.is_some_and(|m| m > position) {
        position += 1;
        if malformed_at == Some(position) {
            lines.push("this is not a metadata envelope".to_string());
            continue;
        }
        if written < good {
            lines.push(envelope_line(&format!("http://example.org/{}", position)));
            written += 1;
        }
    }
    let path = dir.join(name);
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

/// Create a converter over the JSON-lines pipeline with a temp output dir.
pub(crate) fn create_test_converter(mutate: impl FnOnce(&mut RunConfig)) -> (BatchConverter, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new(temp_dir.path().join("out"));
    config.max_concurrent_tasks = 2;
    mutate(&mut config);
    let converter = BatchConverter::new(
        config,
        Arc::new(JsonLinesExtractor),
        Arc::new(JsonLinesEncoder),
    )
    .unwrap();
    (converter, temp_dir)
}

/// Encoder whose sink fails on the write with the given zero-based index.
pub(crate) struct FailingEncoder {
    pub(crate) fail_at: usize,
}

#[async_trait]
impl RecordEncoder for FailingEncoder {
    async fn open(&self, output: OutputStream) -> Result<Box<dyn RecordSink>> {
        let inner = JsonLinesEncoder.open(output).await?;
        Ok(Box::new(FailingSink {
            inner,
            written: 0,
            fail_at: self.fail_at,
        }))
    }
}

struct FailingSink {
    inner: Box<dyn RecordSink>,
    written: usize,
    fail_at: usize,
}

#[async_trait]
impl RecordSink for FailingSink {
    async fn write_record(&mut self, record: &MetadataRecord) -> Result<()> {
        if self.written == self.fail_at {
            return Err(Error::Other("simulated write failure".to_string()));
        }
        self.inner.write_record(record).await?;
        self.written += 1;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.inner.close().await
    }
}

/// Extractor whose stream never yields within any reasonable test timeout.
pub(crate) struct StallingExtractor;

#[async_trait]
impl RecordExtractor for StallingExtractor {
    async fn open(&self, _input: InputStream) -> Result<Box<dyn RecordStream>> {
        Ok(Box::new(StallingStream))
    }
}

struct StallingStream;

#[async_trait]
impl RecordStream for StallingStream {
    async fn next_record(&mut self) -> Result<Option<MetadataRecord>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }
}
