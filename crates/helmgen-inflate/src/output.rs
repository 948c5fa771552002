//! Turning rendered output into resources
//!
//! helm sometimes prints notes or warnings to stdout ahead of the first
//! manifest. A strict parse is tried first; if it fails, everything before
//! the first document separator is dropped and the rest is parsed again.

use helmgen_core::{CoreError, ResourceCollection, ResourceFactory};
use regex::bytes::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use std::sync::LazyLock;

use crate::error::{InflateError, Result};

/// A `---` line, optionally followed by a comment
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^---[ \t]*(#.*)?\r?$").expect("separator pattern is valid")
});

/// Parse renderer stdout, skipping leading non-document text if needed
pub fn parse_output(factory: &dyn ResourceFactory, stdout: &[u8]) -> Result<ResourceCollection> {
    let primary = match factory.from_bytes(stdout) {
        Ok(resources) => return Ok(resources),
        Err(e) => e,
    };
    tracing::debug!(error = %primary, "strict parse of helm output failed, skipping leading text");

    match read_documents(stdout) {
        Ok(nodes) if nodes.is_empty() => Err(InflateError::OutputParse {
            source: primary,
            fallback: None,
        }),
        Ok(nodes) => factory
            .from_nodes(nodes)
            .map_err(|e| InflateError::OutputParse {
                source: primary,
                fallback: Some(e.to_string()),
            }),
        Err(e) => Err(InflateError::OutputParse {
            source: primary,
            fallback: Some(e.to_string()),
        }),
    }
}

/// Documents found after the first separator line, empty ones skipped
///
/// Output without any separator yields no documents. The bytes after the
/// separator are parsed as-is, so invalid UTF-8 there is an error.
pub fn read_documents(stdout: &[u8]) -> std::result::Result<Vec<Value>, CoreError> {
    let Some(separator) = SEPARATOR_RE.find(stdout) else {
        return Ok(Vec::new());
    };

    let mut nodes = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(&stdout[separator.start()..]) {
        let node = Value::deserialize(document)?;
        if !node.is_null() {
            nodes.push(node);
        }
    }
    Ok(nodes)
}
