// src/config.rs
//! Editor configuration.
//!
//! The embedding application decides where config lives and hands the
//! raw TOML string over; the core only parses it. Missing fields fall
//! back to defaults, unknown fields are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Language;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Language for summary strings
    pub language: Language,
    /// Maximum number of change-log entries to retain
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            history_limit: 100,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_full_toml() {
        let config = EditorConfig::from_toml_str(
            r#"
            language = "zh"
            history_limit = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.language, Language::Zh);
        assert_eq!(config.history_limit, 25);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = EditorConfig::from_toml_str("language = \"zh\"").unwrap();
        assert_eq!(config.language, Language::Zh);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_bad_toml_errors() {
        let result = EditorConfig::from_toml_str("language = ");
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("invalid config:"));
    }

    #[test]
    fn test_roundtrip() {
        let config = EditorConfig {
            language: Language::Zh,
            history_limit: 7,
        };

        let serialized = toml::to_string(&config).unwrap();
        let parsed = EditorConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
