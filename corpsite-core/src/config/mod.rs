//! Configuration management for Corpsite
//!
//! Settings come from three layers: built-in defaults, an optional TOML file,
//! and `CORPSITE_*` environment variables. The only setting most deployments
//! touch is the backend base URL.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

mod error;

pub use error::ConfigError;

use crate::i18n::Language;
use crate::logging::LogLevel;

/// Backend origin used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST backend settings
    pub api: ApiConfig,

    /// Durable client storage settings
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Carousel card geometry
    pub carousel: CarouselConfig,

    /// Language used when no preference has been stored yet
    pub locale: LocaleConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Value sent in the User-Agent header
    pub user_agent: String,
}

/// Durable client storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the session and language records
    pub data_dir: PathBuf,

    /// Keep records in memory only (nothing survives the process)
    pub ephemeral: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

/// Carousel geometry, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub card_width: u32,
    pub gap: u32,
    /// Lists this short are centred and never scroll
    pub center_threshold: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub default_language: Language,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: format!("corpsite/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("corpsite");

        Self {
            data_dir,
            ephemeral: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            card_width: 300,
            gap: 24,
            center_threshold: 5,
        }
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: CORPSITE_<SECTION>_<KEY>
    /// Example: CORPSITE_API_BASE_URL=https://cms.example.com/api
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CORPSITE_*` overrides from an arbitrary lookup
    ///
    /// `from_env` passes the process environment; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CORPSITE_API_BASE_URL") {
            self.api.base_url = url;
        }

        if let Some(dir) = lookup("CORPSITE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("CORPSITE_STORAGE_EPHEMERAL") {
            self.storage.ephemeral = parse_value("CORPSITE_STORAGE_EPHEMERAL", &flag)?;
        }

        if let Some(level) = lookup("CORPSITE_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(json) = lookup("CORPSITE_LOG_JSON") {
            self.logging.json_format = parse_value("CORPSITE_LOG_JSON", &json)?;
        }

        if let Some(lang) = lookup("CORPSITE_DEFAULT_LANGUAGE") {
            self.locale.default_language = parse_value("CORPSITE_DEFAULT_LANGUAGE", &lang)?;
        }

        if let Some(width) = lookup("CORPSITE_CAROUSEL_CARD_WIDTH") {
            self.carousel.card_width = parse_value("CORPSITE_CAROUSEL_CARD_WIDTH", &width)?;
        }
        if let Some(gap) = lookup("CORPSITE_CAROUSEL_GAP") {
            self.carousel.gap = parse_value("CORPSITE_CAROUSEL_GAP", &gap)?;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api.base_url.clone()));
        }

        if !self.storage.ephemeral && self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "storage.data_dir must be set unless storage is ephemeral".to_string(),
            ));
        }

        self.logging
            .level
            .parse::<LogLevel>()
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;

        if self.carousel.card_width == 0 {
            return Err(ConfigError::ValidationFailed(
                "carousel.card_width must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })
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
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.locale.default_language, Language::En);
        assert_eq!(config.carousel.center_threshold, 5);
    }

    #[test]
    fn test_base_strips_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "https://cms.example.com/api/".to_string();
        assert_eq!(config.api.base(), "https://cms.example.com/api");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.api.base_url = "cms.example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        config = Config::default();
        config.carousel.card_width = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.storage.data_dir = PathBuf::new();
        assert!(config.validate().is_err());
        config.storage.ephemeral = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();

        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("CORPSITE_API_BASE_URL", "https://cms.example.com/api"),
                ("CORPSITE_DEFAULT_LANGUAGE", "ar"),
                ("CORPSITE_LOG_JSON", "true"),
                ("CORPSITE_CAROUSEL_GAP", "16"),
            ]))
            .unwrap();

        assert_eq!(config.api.base_url, "https://cms.example.com/api");
        assert_eq!(config.locale.default_language, Language::Ar);
        assert!(config.logging.json_format);
        assert_eq!(config.carousel.gap, 16);
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup_from(&[("CORPSITE_DEFAULT_LANGUAGE", "fr")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "CORPSITE_DEFAULT_LANGUAGE", .. }
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpsite.toml");

        let mut config = Config::default();
        config.api.base_url = "https://cms.example.com/api".to_string();
        config.carousel.card_width = 280;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, config.api.base_url);
        assert_eq!(loaded.carousel, config.carousel);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpsite.toml");
        std::fs::write(&path, "[api]\nbase_url = \"https://cms.example.com\"\n").unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://cms.example.com");
        assert_eq!(loaded.logging.level, "info");
        assert_eq!(loaded.carousel.card_width, 300);
    }
}
