//! Newline-delimited JSON pipeline
//!
//! Reference extractor/encoder pair over the simplest container shape that
//! still exercises the full boundary: one JSON metadata envelope per line.
//! Blank lines are skipped; a line that fails to parse is a decode error at
//! the position it occurred, which makes this pair convenient for exercising
//! soft-mode behavior.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};

use super::{
    InputStream, MetadataRecord, OutputStream, RecordEncoder, RecordExtractor, RecordSink,
    RecordStream,
};
use crate::error::{Error, Result};

/// Extractor for newline-delimited JSON envelope files
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLinesExtractor;

#[async_trait]
impl RecordExtractor for JsonLinesExtractor {
    async fn open(&self, input: InputStream) -> Result<Box<dyn RecordStream>> {
        Ok(Box::new(JsonLinesStream {
            lines: BufReader::new(input).lines(),
            line_number: 0,
        }))
    }
}

struct JsonLinesStream {
    lines: Lines<BufReader<InputStream>>,
    line_number: u64,
}

#[async_trait]
impl RecordStream for JsonLinesStream {
    async fn next_record(&mut self) -> Result<Option<MetadataRecord>> {
        loop {
            self.line_number += 1;
            let line = match self.lines.next_line().await? {
                Some(line) => line,
                None => return Ok(None),
            };
            if line.trim().is_empty() {
                continue;
            }
            let envelope = serde_json::from_str(&line).map_err(|e| {
                Error::Other(format!(
                    "invalid JSON envelope on line {}: {}",
                    self.line_number, e
                ))
            })?;
            return Ok(Some(MetadataRecord::from_envelope(envelope)));
        }
    }
}

/// Encoder writing one JSON envelope per line
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLinesEncoder;

#[async_trait]
impl RecordEncoder for JsonLinesEncoder {
    async fn open(&self, output: OutputStream) -> Result<Box<dyn RecordSink>> {
        Ok(Box::new(JsonLinesSink {
            writer: BufWriter::new(output),
        }))
    }
}

struct JsonLinesSink {
    writer: BufWriter<OutputStream>,
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn write_record(&mut self, record: &MetadataRecord) -> Result<()> {
        let mut line = serde_json::to_vec(&record.envelope)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}
