//! Logging setup
//!
//! The library only emits `tracing` events; binaries install a subscriber once
//! at startup. `RUST_LOG` wins over the configured level. The HTTP stack
//! underneath the API client is capped at `warn` unless `RUST_LOG` says
//! otherwise, so `debug` shows request spans rather than connection-pool chatter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Crates whose events are capped at `warn`
const HTTP_STACK: [&str; 5] = ["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Subscriber settings resolved from [`LoggingConfig`] or CLI flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub with_timestamp: bool,
    pub with_target: bool,
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            with_timestamp: true,
            with_target: true,
            json_format: false,
        }
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Filter directives used when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.as_str().to_string()];
        if self.level < LogLevel::Warn {
            directives.extend(HTTP_STACK.iter().map(|krate| format!("{krate}=warn")));
        }
        directives.join(",")
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = LoggingError;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            level: config.level.parse()?,
            with_timestamp: config.with_timestamp,
            with_target: config.with_target,
            json_format: config.json_format,
        })
    }
}

/// Install the default subscriber: `info`, human-readable
///
/// # Example
/// ```
/// use corpsite_core::logging::init_logging;
///
/// init_logging().expect("Failed to initialize logging");
/// ```
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Install a subscriber built from `config`
///
/// Fails if a global subscriber is already set.
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives())
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?,
    };

    let fmt_layer = fmt::layer().with_target(config.with_target);
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match (config.json_format, config.with_timestamp) {
        (true, true) => registry.with(fmt_layer.json()).try_init(),
        (true, false) => registry.with(fmt_layer.json().without_time()).try_init(),
        (false, true) => registry.with(fmt_layer).try_init(),
        (false, false) => registry.with(fmt_layer.without_time()).try_init(),
    };

    result.map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}
