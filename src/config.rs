//! Pipeline configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a
//! valid configuration:
//!
//! ```json
//! {
//!   "cache": {
//!     "enabled": true,
//!     "default_duration_secs": 300,
//!     "allowed_headers": ["accept-language"],
//!     "max_entries": 10000
//!   },
//!   "filter": { "max_depth": 64, "allow_empty": false }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::MAX_FILTER_DEPTH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

/// Caching interceptor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Master switch (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// TTL when neither metadata nor an operation policy sets one (default: 300)
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,

    /// Request headers that take part in the cache key
    #[serde(default)]
    pub allowed_headers: Vec<String>,

    /// Capacity of the in-memory store (default: 10000)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_duration_secs() -> u64 {
    300
}

/// Longest accepted `cache.default_duration_secs`: one year
pub const MAX_CACHE_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

fn default_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            default_duration_secs: default_duration_secs(),
            allowed_headers: Vec::new(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_secs(self.default_duration_secs)
    }
}

/// Filter interceptor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Deepest accepted filter tree (default: 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Treat an empty body as "match everything" (default: false)
    #[serde(default)]
    pub allow_empty: bool,
}

fn default_max_depth() -> usize {
    MAX_FILTER_DEPTH
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            allow_empty: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid("cache.max_entries must be > 0".into()));
        }
        if self.cache.default_duration_secs > MAX_CACHE_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "cache.default_duration_secs must be <= {}",
                MAX_CACHE_DURATION_SECS
            )));
        }
        if self.filter.max_depth == 0 {
            return Err(ConfigError::Invalid("filter.max_depth must be > 0".into()));
        }
        if let Some(h) = self.cache.allowed_headers.iter().find(|h| h.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "cache.allowed_headers contains a blank name: {:?}",
                h
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.default_duration(), Duration::from_secs(300));
        assert_eq!(config.filter.max_depth, MAX_FILTER_DEPTH);
        assert!(!config.filter.allow_empty);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = PipelineConfig::from_json(
            r#"{"cache": {"allowed_headers": ["Accept-Language"]}, "filter": {"allow_empty": true}}"#,
        )
        .unwrap();
        assert_eq!(config.cache.allowed_headers, vec!["Accept-Language"]);
        assert_eq!(config.cache.max_entries, 10_000);
        assert!(config.filter.allow_empty);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{"cache": {"max_entries": 0}}"#,
            r#"{"filter": {"max_depth": 0}}"#,
            r#"{"cache": {"allowed_headers": [" "]}}"#,
            r#"{"cache": {"default_duration_secs": 18446744073709551615}}"#,
            r#"{"cache": {"default_duration_secs": 31536001}}"#,
        ] {
            assert!(matches!(
                PipelineConfig::from_json(json),
                Err(ConfigError::Invalid(_))
            ));
        }
        let year = format!(r#"{{"cache": {{"default_duration_secs": {}}}}}"#, MAX_CACHE_DURATION_SECS);
        assert!(PipelineConfig::from_json(&year).is_ok());
        assert!(matches!(
            PipelineConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cache": {{"default_duration_secs": 5}}}}"#).unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.cache.default_duration(), Duration::from_secs(5));

        let missing = PipelineConfig::load(Path::new("/nonexistent/aerofilter.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
