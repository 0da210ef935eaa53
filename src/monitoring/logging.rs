//! Structured logging for voteguard.
//!
//! The engine emits `tracing` events; this module installs a subscriber
//! for applications and tests that do not bring their own.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text
    Text,
    /// JSON
    Json,
}

/// Logger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum log level
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Extra `EnvFilter` directives, e.g. `voteguard=trace`
    pub directives: Option<String>,
    /// Include timestamps (text format only)
    pub timestamps: bool,
    /// Include event targets
    pub include_targets: bool,
}

impl LoggerConfig {
    /// The filter directive built from level and extra directives.
    pub fn filter_directive(&self) -> String {
        match self.directives.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(extra) => format!("{},{}", self.level, extra.trim()),
            None => self.level.to_string(),
        }
    }

    /// `RUST_LOG` if set, otherwise [`filter_directive`](Self::filter_directive).
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.filter_directive()))
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            directives: None,
            timestamps: true,
            include_targets: true,
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(config: &LoggerConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(config.include_targets);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text if config.timestamps => builder.try_init(),
        LogFormat::Text => builder.without_time().try_init(),
    };

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let mut config = LoggerConfig::default();
        assert_eq!(config.filter_directive(), "info");

        config.level = LogLevel::Warn;
        config.directives = Some(" voteguard=trace ".to_string());
        assert_eq!(config.filter_directive(), "warn,voteguard=trace");

        config.directives = Some("  ".to_string());
        assert_eq!(config.filter_directive(), "warn");
    }

    #[test]
    fn test_config_from_json() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.timestamps);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggerConfig::default();
        init_logging(&config);
        assert!(!init_logging(&config));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
