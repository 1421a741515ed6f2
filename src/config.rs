//! Tunable parameters for the deduplication engine.
//!
//! Defaults match the production pipeline. A YAML file can override any
//! subset of them:
//!
//! ```yaml
//! min_content_length: 40
//! content_prefix: 320
//! hamming_threshold: 3
//! bucket_bits: 16
//! ```

use crate::error::DedupError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Minimum trimmed content length (in characters) a record needs to survive.
pub const MIN_CONTENT_LEN: usize = 40;
/// Number of content characters that feed the SimHash tokenizer.
pub const CONTENT_PREFIX: usize = 320;
/// Fingerprints within this many differing bits are near-duplicates.
pub const SIMHASH_HAMMING_THRESH: u32 = 3;
/// Width of the fingerprint prefix used as the coarse bucket key.
pub const BUCKET_BITS: u32 = 16;

/// Engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DedupConfig {
    pub min_content_length: usize,
    pub content_prefix: usize,
    pub hamming_threshold: u32,
    pub bucket_bits: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            min_content_length: MIN_CONTENT_LEN,
            content_prefix: CONTENT_PREFIX,
            hamming_threshold: SIMHASH_HAMMING_THRESH,
            bucket_bits: BUCKET_BITS,
        }
    }
}

impl DedupConfig {
    /// Load a config from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Io`] if the file cannot be read,
    /// [`DedupError::Config`] if it is not valid YAML, and
    /// [`DedupError::InvalidSetting`] if a value is out of range.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DedupError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| DedupError::io(path, e))?;
        let config = Self::from_yaml(&raw).map_err(|source| DedupError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(?config, "Loaded dedup config");
        Ok(config)
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Check that every value is usable by the engine.
    pub fn validate(&self) -> Result<(), DedupError> {
        if !(1..=64).contains(&self.bucket_bits) {
            return Err(DedupError::InvalidSetting(format!(
                "bucket_bits must be between 1 and 64, got {}",
                self.bucket_bits
            )));
        }
        if self.hamming_threshold > 64 {
            return Err(DedupError::InvalidSetting(format!(
                "hamming_threshold must be at most 64, got {}",
                self.hamming_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DedupConfig::default();
        assert_eq!(config.min_content_length, 40);
        assert_eq!(config.content_prefix, 320);
        assert_eq!(config.hamming_threshold, 3);
        assert_eq!(config.bucket_bits, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DedupConfig::from_yaml("min_content_length: 10\n").unwrap();
        assert_eq!(config.min_content_length, 10);
        assert_eq!(config.content_prefix, 320);
        assert_eq!(config.bucket_bits, 16);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(DedupConfig::from_yaml("\n").unwrap(), DedupConfig::default());
    }

    #[test]
    fn test_validate_rejects_bucket_bits() {
        let config = DedupConfig {
            bucket_bits: 0,
            ..DedupConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DedupError::InvalidSetting(_))
        ));

        let config = DedupConfig {
            bucket_bits: 65,
            ..DedupConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "news_dedup_config_{}.yaml",
            std::process::id()
        ));
        tokio::fs::write(&path, "hamming_threshold: 5\nbucket_bits: 8\n")
            .await
            .unwrap();
        let config = DedupConfig::load(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;
        assert_eq!(config.hamming_threshold, 5);
        assert_eq!(config.bucket_bits, 8);
        assert_eq!(config.min_content_length, 40);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = DedupConfig::load("/definitely/not/here.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, DedupError::Io { .. }));
    }
}
