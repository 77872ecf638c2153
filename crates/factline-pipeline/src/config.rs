//! Clustering configuration

use serde::Deserialize;

/// Configuration for the event clusterer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Minimum title similarity for joining an existing event (0.0-1.0).
    ///
    /// Tuned against the character-sequence ratio; treat as configuration,
    /// not a constant, if the similarity algorithm changes.
    pub similarity_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
        }
    }
}
