//! Configuration loading for the CLI.
//!
//! Defaults cover every setting; an optional toml file overrides the parts
//! it names. The vocabularies and the similarity threshold stay immutable
//! once loaded and are passed by reference into the pipeline.

use anyhow::Context;
use factline_pipeline::{ClusterConfig, SignificanceConfig};
use serde::Deserialize;
use std::fs;

/// Pipeline configuration assembled from defaults plus an optional file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FactlineConfig {
    /// Event clustering settings.
    pub cluster: ClusterConfig,

    /// Significance filter vocabularies.
    pub significance: SignificanceConfig,
}

impl FactlineConfig {
    /// Load configuration, merging a toml file over defaults when given.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = FactlineConfig::load(None).unwrap();
        assert_eq!(config.cluster.similarity_threshold, 0.6);
        assert!(!config.significance.whitelist_tokens.is_empty());
    }

    #[test]
    fn test_file_overrides_named_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cluster]\nsimilarity_threshold = 0.8").unwrap();

        let config = FactlineConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.cluster.similarity_threshold, 0.8);
        // Unnamed sections keep their defaults.
        assert!(!config.significance.exclude_tokens.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(FactlineConfig::load(Some("/nonexistent/factline.toml")).is_err());
    }
}
