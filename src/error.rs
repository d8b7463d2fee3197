//! Unified error types for stubtree.
//!
//! Defines [`StubError`] (the main crate error enum), [`SelectionError`]
//! for per-request response selection failures, and [`ValidationError`]
//! for configuration validation findings. The display text of the
//! configuration variants is what the engine reports while it is in a
//! failed state, so it is written for the person editing the file.

use std::path::PathBuf;

use crate::config::validation::SectionName;
use crate::engine::tree::ActionMode;

/// One validation finding, tied to its location in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub section: SectionName,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in {}: {}", self.section, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for e in errors {
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "\n  - {e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StubError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Error loading configuration file: {} ({source})", path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading configuration file: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "Configuration file was read correctly but failed validation. Errors:{}",
        format_errors(.errors)
    )]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

impl StubError {
    /// Whether this is one of the classified configuration failures whose
    /// message is safe to show to API consumers.
    #[must_use]
    pub const fn is_config_failure(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. } | Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }
}

/// Why a matched action could not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("action has no responses configured")]
    NoResponse,

    #[error("mode '{0}' is not supported")]
    UnsupportedMode(ActionMode),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(section: &str, message: &str) -> ValidationError {
        ValidationError {
            section: SectionName::new(section),
            message: message.into(),
        }
    }

    #[test]
    fn validation_error_format() {
        assert_eq!(
            error("$.path", "Endpoint must have a path").to_string(),
            "Error in $.path: Endpoint must have a path"
        );
    }

    #[test]
    fn validation_report_lists_every_error() {
        let err = StubError::ConfigValidation {
            errors: vec![error("$", "Broken"), error("$.path", "Broken again")],
        };
        assert_eq!(
            err.to_string(),
            "Configuration file was read correctly but failed validation. Errors:\n  \
             - Error in $: Broken\n  \
             - Error in $.path: Broken again"
        );
    }

    #[test]
    fn load_and_parse_messages_are_classified() {
        let load = StubError::ConfigLoad {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(load.to_string().starts_with("Error loading configuration file:"));
        assert!(load.is_config_failure());

        let parse = StubError::ConfigParse {
            path: "bad.json".into(),
            source: "expected value".into(),
        };
        assert!(parse.to_string().starts_with("Error reading configuration file:"));
        assert!(!StubError::UnsupportedFormat("xml".into()).is_config_failure());
    }
}
