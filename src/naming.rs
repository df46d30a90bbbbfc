//! Output file naming
//!
//! Maps an input container name to the name of its derivative WAT file. The
//! mapping is total and deterministic: the batch driver relies on every input
//! computing exactly one output location, so that concurrent attempts at the
//! same input always collide on the same create-only path.

use std::path::{Path, PathBuf};

/// Suffix appended to every generated output name
const WAT_SUFFIX: &str = ".wat.gz";

/// Recognized compressed-archive suffixes, longest first
///
/// A matching suffix is stripped before appending [`WAT_SUFFIX`]; any other
/// suffix is left in place.
const COMPRESSED_SUFFIXES: &[&str] = &[".warc.gz", ".arc.gz", ".gz"];

/// Derive the output base name for an input container name.
///
/// `crawl-0001.warc.gz` becomes `crawl-0001.wat.gz`; an unrecognized suffix is
/// kept, so `crawl-0002.arc` becomes `crawl-0002.arc.wat.gz`.
pub fn wat_basename(input_name: &str) -> String {
    for suffix in COMPRESSED_SUFFIXES {
        if let Some(stem) = input_name.strip_suffix(suffix) {
            return format!("{}{}", stem, WAT_SUFFIX);
        }
    }
    format!("{}{}", input_name, WAT_SUFFIX)
}

/// Compute the full output location for an input container.
///
/// The location is `<output_dir>/<wat_basename(file name of input)>`. Inputs
/// without a final path component (which glob expansion never produces) fall
/// back to an empty base name rather than being rejected.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(wat_basename(&name))
}
