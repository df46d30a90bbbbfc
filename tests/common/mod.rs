//! Shared fixtures for wat-gen integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wat_gen::{BatchConverter, JsonLinesEncoder, JsonLinesExtractor, RunConfig};

/// One valid metadata envelope line for the given URI.
pub fn envelope_line(uri: &str) -> String {
    format!(
        r#"{{"Envelope":{{"WARC-Header-Metadata":{{"WARC-Target-URI":"{}"}}}}}}"#,
        uri
    )
}

/// Write a container fixture with `good` valid records and, optionally, a
/// malformed line at the given 1-based record position.
pub fn write_container(
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
            lines.push("<<corrupt record>>".to_string());
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

/// Build a converter over the bundled JSON-lines pipeline.
pub fn build_converter(mutate: impl FnOnce(&mut RunConfig)) -> (BatchConverter, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new(temp_dir.path().join("wat"));
    mutate(&mut config);
    let converter = BatchConverter::new(
        config,
        Arc::new(JsonLinesExtractor),
        Arc::new(JsonLinesEncoder),
    )
    .unwrap();
    (converter, temp_dir)
}

/// Turn a glob relative to `dir` into an absolute pattern string.
pub fn pattern(dir: &Path, glob: &str) -> String {
    dir.join(glob).to_string_lossy().into_owned()
}
