use crate::error::SearchError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// PageRank parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub max_iterations: usize,
    /// Must lie strictly between 0 and 1.
    pub damping: f64,
    /// Largest per-node change still counted as converged.
    pub threshold: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self { max_iterations: 50, damping: 0.85, threshold: 1e-6 }
    }
}

impl RankConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(SearchError::InvalidDamping(self.damping));
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(SearchError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Engine-wide settings. Every field has a default, so a JSON config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache_capacity: usize,
    /// Documents per replayed query that get connected in the co-occurrence graph.
    pub top_k: usize,
    /// Maximum number of non-empty query-log lines replayed.
    pub query_log_limit: usize,
    /// Stop indexing once this many words were indexed. `None` indexes everything.
    pub max_indexed_words: Option<u64>,
    pub rank: RankConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 20,
            top_k: 10,
            query_log_limit: 10_000,
            max_indexed_words: Some(500_000),
            rank: RankConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.cache_capacity == 0 {
            return Err(SearchError::ZeroCapacity);
        }
        if self.top_k == 0 {
            return Err(SearchError::ZeroTopK);
        }
        self.rank.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"cache_capacity": 5, "rank": {"damping": 0.5}}"#).unwrap();
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.rank.damping, 0.5);
        assert_eq!(config.rank.max_iterations, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = EngineConfig { cache_capacity: 0, ..EngineConfig::default() };
        assert_eq!(config.validate(), Err(SearchError::ZeroCapacity));
        let config = EngineConfig { top_k: 0, ..EngineConfig::default() };
        assert_eq!(config.validate(), Err(SearchError::ZeroTopK));
        let rank = RankConfig { threshold: -1.0, ..RankConfig::default() };
        assert_eq!(rank.validate(), Err(SearchError::InvalidThreshold(-1.0)));
    }
}
