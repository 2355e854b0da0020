//! Persistence of the linkage graph.
//!
//! The graph is written as pretty-printed UTF-8 JSON with a 4-space indent.
//! Non-ASCII characters are written as-is.

use crate::error::{DruglinkError, ParseError};
use crate::graph::LinkageGraph;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Serializes `graph` to a pretty-printed JSON string.
pub fn to_json_string(graph: &LinkageGraph) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    graph.serialize(&mut serializer)?;
    buffer.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes `graph` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns [`DruglinkError::Io`] when a directory or the file cannot be
/// created or written.
pub fn write_graph(graph: &LinkageGraph, path: &Path) -> Result<(), DruglinkError> {
    let io_error = |source: io::Error| DruglinkError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let text = to_json_string(graph).map_err(|e| io_error(e.into()))?;
    fs::write(path, text).map_err(io_error)?;

    info!(path = %path.display(), journals = graph.journals.len(), "Wrote linkage graph");
    Ok(())
}

/// Reads a graph previously written by [`write_graph`].
///
/// # Errors
///
/// [`DruglinkError::Io`] when the file cannot be read and
/// [`DruglinkError::Source`] when it does not hold a linkage graph.
pub fn read_graph(path: &Path) -> Result<LinkageGraph, DruglinkError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|e| DruglinkError::Source {
        path: path.to_path_buf(),
        source: ParseError::from(e),
    })
}

/// Reads an output document as untyped JSON, for the ad hoc queries.
///
/// # Errors
///
/// As [`read_graph`], but any well-formed JSON is accepted.
pub fn read_document(path: &Path) -> Result<Value, DruglinkError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|e| DruglinkError::Source {
        path: path.to_path_buf(),
        source: ParseError::from(e),
    })
}

fn read(path: &Path) -> Result<String, DruglinkError> {
    fs::read_to_string(path).map_err(|source| DruglinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}
