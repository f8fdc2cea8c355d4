//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {reason}")]
    FileRead { path: PathBuf, reason: String },

    #[error("Failed to write configuration file {path}: {reason}")]
    FileWrite { path: PathBuf, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Invalid API base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
