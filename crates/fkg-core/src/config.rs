//! FKG Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults that reproduce the extraction and validation constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Entity and relationship extraction
    pub extraction: ExtractionConfig,

    /// Validation pipeline
    pub validation: ValidationConfig,

    /// Quality control history and statistics
    pub quality: QualityConfig,

    /// Graph store behaviour
    pub graph: GraphConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Apply `FKG_*` overrides from an arbitrary key lookup.
    ///
    /// Only keys the lookup returns are touched, so file values survive
    /// unless the environment names them explicitly.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Extraction
        override_parsed(&lookup, "FKG_WINDOW_SIZE", &mut self.extraction.window_size)?;
        override_parsed(&lookup, "FKG_CONTEXT_RADIUS", &mut self.extraction.context_radius)?;
        override_parsed(
            &lookup,
            "FKG_RELATIONSHIP_THRESHOLD",
            &mut self.extraction.relationship_threshold,
        )?;
        override_parsed(&lookup, "FKG_MAX_TEXT_BYTES", &mut self.extraction.max_text_bytes)?;

        // Validation
        override_parsed(&lookup, "FKG_BATCH_SIZE", &mut self.validation.batch_size)?;
        override_parsed(
            &lookup,
            "FKG_AUTO_APPLY_CORRECTIONS",
            &mut self.validation.auto_apply_corrections,
        )?;

        // Quality
        override_parsed(&lookup, "FKG_QUALITY_HISTORY_DAYS", &mut self.quality.history_days)?;
        override_parsed(
            &lookup,
            "FKG_QUALITY_MAX_HISTORY",
            &mut self.quality.max_history_entries,
        )?;
        override_parsed(&lookup, "FKG_ANOMALY_SIGMA", &mut self.quality.anomaly_sigma)?;

        // Graph
        override_parsed(
            &lookup,
            "FKG_MAX_TRAVERSAL_DEPTH",
            &mut self.graph.max_traversal_depth,
        )?;

        // Logging
        if let Some(level) = lookup("FKG_LOG_LEVEL").or_else(|| lookup("LOG_LEVEL")) {
            self.logging.level = level;
        }
        override_parsed(&lookup, "FKG_LOG_JSON", &mut self.logging.json_format)?;

        Ok(())
    }

    /// Reject values the services cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.window_size == 0 {
            return Err(invalid("extraction.window_size", self.extraction.window_size));
        }
        if !(0.0..=1.0).contains(&self.extraction.relationship_threshold) {
            return Err(invalid(
                "extraction.relationship_threshold",
                self.extraction.relationship_threshold,
            ));
        }
        if self.validation.batch_size == 0 {
            return Err(invalid("validation.batch_size", self.validation.batch_size));
        }
        if self.quality.max_history_entries == 0 {
            return Err(invalid(
                "quality.max_history_entries",
                self.quality.max_history_entries,
            ));
        }
        if !self.quality.anomaly_sigma.is_finite() || self.quality.anomaly_sigma <= 0.0 {
            return Err(invalid("quality.anomaly_sigma", self.quality.anomaly_sigma));
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        })?;
    }
    Ok(())
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum distance (bytes) between the starts of two paired entities
    pub window_size: usize,

    /// Characters on each side of an entity used as its context
    pub context_radius: usize,

    /// Minimum confidence for a relationship candidate to be kept
    pub relationship_threshold: f64,

    /// Upper bound on text accepted per page
    pub max_text_bytes: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            context_radius: 50,
            relationship_threshold: 0.5,
            max_text_bytes: 4 * 1024 * 1024, // 4MB
        }
    }
}

/// Validation pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Items per batch chunk
    pub batch_size: usize,

    /// Apply suggested corrections instead of only reporting them
    pub auto_apply_corrections: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            auto_apply_corrections: false,
        }
    }
}

/// Quality control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Days of history retained per metric
    pub history_days: i64,

    /// Hard cap on history entries per metric key
    pub max_history_entries: usize,

    /// Standard deviations beyond which a value is an anomaly
    pub anomaly_sigma: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            history_days: 30,
            max_history_entries: 1000,
            anomaly_sigma: 2.0,
        }
    }
}

/// Graph store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum depth accepted by subgraph queries
    pub max_traversal_depth: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_traversal_depth: 3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.window_size, 100);
        assert_eq!(config.extraction.context_radius, 50);
        assert_eq!(config.validation.batch_size, 100);
        assert_eq!(config.quality.history_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_only_touch_present_keys() {
        let mut config = AppConfig::default();
        config.quality.history_days = 7;
        config
            .apply_overrides(lookup_from(&[
                ("FKG_BATCH_SIZE", "25"),
                ("FKG_AUTO_APPLY_CORRECTIONS", "true"),
                ("LOG_LEVEL", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.validation.batch_size, 25);
        assert!(config.validation.auto_apply_corrections);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.quality.history_days, 7);
    }

    #[test]
    fn test_invalid_override_names_the_key() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("FKG_WINDOW_SIZE", "wide")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "FKG_WINDOW_SIZE");
                assert_eq!(value, "wide");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [validation]
            batch_size = 10

            [quality]
            anomaly_sigma = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.validation.batch_size, 10);
        assert!(!config.validation.auto_apply_corrections);
        assert_eq!(config.quality.anomaly_sigma, 3.0);
        assert_eq!(config.extraction.window_size, 100);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = AppConfig::default();
        config.validation.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
