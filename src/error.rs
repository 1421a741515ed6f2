//! Error types for the I/O boundary and configuration.
//!
//! The deduplication engine itself cannot fail; everything here comes from
//! reading the input document, loading the YAML config, or writing output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading input, loading config, or writing output.
#[derive(Debug, Error)]
pub enum DedupError {
    /// The input document does not exist.
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input document is not valid JSON.
    #[error("failed to parse JSON from {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The output records could not be rendered as JSON.
    #[error("failed to encode JSON for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The YAML config file could not be parsed.
    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config value is out of range.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

impl DedupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DedupError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_message() {
        let err = DedupError::InputNotFound(PathBuf::from("data/missing.json"));
        assert_eq!(err.to_string(), "input not found: data/missing.json");
    }

    #[test]
    fn test_json_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DedupError::Json {
            path: PathBuf::from("in.json"),
            source,
        };
        assert!(err.to_string().starts_with("failed to parse JSON from in.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
