//! Extraction pipeline and encoder boundaries
//!
//! This module defines the trait seams between the batch core and the two
//! format-aware collaborators it drives as black boxes:
//!
//! - [`RecordExtractor`] / [`RecordStream`]: decode an input container into a
//!   lazy, finite, pull-based sequence of metadata records. The stream exposes
//!   exactly one operation — next record or end — with no peek or rewind, and
//!   is not restartable once driven.
//! - [`RecordEncoder`] / [`RecordSink`]: serialize each record into the output
//!   container. Closing the sink flushes and finalizes any trailer the format
//!   requires.
//!
//! A real WARC/ARC metadata extraction library plugs in through these traits.
//! The bundled [`JsonLinesExtractor`]/[`JsonLinesEncoder`] pair handles
//! newline-delimited JSON envelopes and is what the `wat-gen` binary wires up
//! by default.

mod json_lines;

pub use json_lines::{JsonLinesEncoder, JsonLinesExtractor};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// Readable byte stream handed to an extractor
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Writable byte stream handed to an encoder
pub type OutputStream = Box<dyn AsyncWrite + Send + Unpin>;

/// One decoded unit of metadata, corresponding to one captured resource
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataRecord {
    /// URI of the captured resource, when the container records one
    pub target_uri: Option<String>,
    /// Metadata envelope, a JSON document in the WAT envelope shape
    pub envelope: Value,
}

impl MetadataRecord {
    /// Create a record from a bare envelope, pulling the target URI out of
    /// the envelope's `WARC-Target-URI` header field when present.
    pub fn from_envelope(envelope: Value) -> Self {
        let target_uri = envelope
            .get("Envelope")
            .and_then(|e| e.get("WARC-Header-Metadata"))
            .and_then(|h| h.get("WARC-Target-URI"))
            .and_then(|u| u.as_str())
            .map(str::to_string);
        Self {
            target_uri,
            envelope,
        }
    }
}

/// Decodes input containers into record streams
#[async_trait]
pub trait RecordExtractor: Send + Sync {
    /// Open a record stream over the given input bytes.
    ///
    /// Failures here are reported as processing errors by the task that owns
    /// the stream, not as input-open errors — the byte stream itself was
    /// already acquired by the time an extractor sees it.
    async fn open(&self, input: InputStream) -> Result<Box<dyn RecordStream>>;
}

/// A lazy, finite sequence of metadata records
#[async_trait]
pub trait RecordStream: Send {
    /// Pull the next record, or `Ok(None)` once the container is exhausted.
    ///
    /// End-of-input is a sentinel, not an error. After returning `None` or an
    /// error the stream must not be driven further.
    async fn next_record(&mut self) -> Result<Option<MetadataRecord>>;
}

/// Serializes metadata records into output containers
#[async_trait]
pub trait RecordEncoder: Send + Sync {
    /// Open a record sink over the given output bytes.
    async fn open(&self, output: OutputStream) -> Result<Box<dyn RecordSink>>;
}

/// Write side of one output container
#[async_trait]
pub trait RecordSink: Send {
    /// Serialize and append one record.
    async fn write_record(&mut self, record: &MetadataRecord) -> Result<()>;

    /// Flush buffered bytes and finalize the container.
    ///
    /// Consumes the sink; a sink that is dropped without `close` may leave an
    /// unflushed, trailer-less output behind, which is exactly what a failed
    /// task leaves.
    async fn close(self: Box<Self>) -> Result<()>;
}
