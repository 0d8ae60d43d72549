//! Configuration
//!
//! One JSON document covering session settings, scoring rules and file
//! locations. Every field has a default, so an empty object is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::quiz::scoring::ScoringRules;
use crate::quiz::session::SessionConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Session settings
    pub session: SessionConfig,
    /// Scoring table
    pub scoring: ScoringRules,
    /// Country dataset; the built-in sample catalog when absent
    pub catalog_path: Option<PathBuf>,
    /// High score file; the platform data directory when absent
    pub high_score_path: Option<PathBuf>,
}

impl QuizConfig {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::clock::TimeLimit;

    #[test]
    fn test_empty_config_is_default() {
        let config = QuizConfig::from_json("{}").unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.session.hint_budget, crate::DEFAULT_HINT_BUDGET);
        assert_eq!(config.scoring, ScoringRules::canonical());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "session": {"time_limit": {"minutes": 3}, "hint_budget": 1, "auto_advance_ms": 1200},
            "scoring": {"tiers": [], "score_floor": null},
            "catalog_path": "countries.json"
        }"#;
        let config = QuizConfig::from_json(json).unwrap();
        assert_eq!(config.session.time_limit, TimeLimit::Minutes(3));
        assert_eq!(config.session.hint_budget, 1);
        assert_eq!(config.session.choice_count, crate::DEFAULT_CHOICE_COUNT);
        assert!(config.scoring.tiers.is_empty());
        assert_eq!(config.catalog_path, Some(PathBuf::from("countries.json")));
        assert_eq!(config.high_score_path, None);
    }

    #[test]
    fn test_load_missing_file() {
        let result = QuizConfig::load(Path::new("/no/such/config.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"session": {"hint_budget": -1}}"#).unwrap();
        assert!(matches!(QuizConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
