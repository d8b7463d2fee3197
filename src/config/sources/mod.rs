//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides file-based sources (JSON, and YAML behind the `yaml` feature),
//! an in-memory source, and the [`parse_document`] helper for
//! format-specific deserialization.

pub mod file_source;
pub mod json;
pub mod memory;

#[cfg(feature = "yaml")]
pub mod yaml;

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::model::ConfigDocument;
use crate::config::ConfigVersion;
use crate::error::StubError;

/// Parse a document string based on file extension.
///
/// Blank content parses as a null document, same as a literal `null`.
pub fn parse_document(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Option<ConfigDocument>, StubError> {
    if content.trim().is_empty() {
        return Ok(None);
    }

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| StubError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        "json" => serde_json::from_str(content).map_err(|e| StubError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(StubError::UnsupportedFormat(other.to_string())),
    }
}

/// Lowercased extension of `path`, or an empty string.
#[must_use]
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Version of the raw document bytes.
#[must_use]
pub fn version_of(content: impl AsRef<[u8]>) -> ConfigVersion {
    ConfigVersion::Hash(sha256_hex(content.as_ref()))
}

/// Decode raw document bytes. Invalid UTF-8 is a malformed document.
pub fn decode_utf8(bytes: Vec<u8>, path_display: &str) -> Result<String, StubError> {
    String::from_utf8(bytes).map_err(|e| StubError::ConfigParse {
        path: path_display.to_string(),
        source: Box::new(e),
    })
}
