//! Logging infrastructure for the UTXO matcher
//!
//! This module wires the `log` facade to `env_logger` with a configurable
//! format and provides small helpers for structured, context-tagged events.
//!
//! - Addresses and transaction ids are truncated with [`sanitize_for_logging`]
//!   before they reach event parameters
//! - Search timings are emitted at debug level under the
//!   `utxo_matcher::benchmark` target, so they can be enabled on their own
//! - JSON output is available for machine processing
//!
//! # Usage
//!
//! ```
//! use utxo_matcher::logging;
//! use utxo_matcher::logging::{LogConfig, LogLevel};
//! use serde_json::json;
//!
//! logging::init(&LogConfig::default()).expect("Failed to initialize logging");
//!
//! logging::log_selection(LogLevel::Info, "selection_started", Some(json!({ "pages": 3 })));
//! ```

use crate::selection::engine::BENCHMARK_TARGET;
use chrono::Local;
use env_logger::Builder;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write as IoWrite;
use std::sync::Once;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error conditions
    Error,
    /// Warning conditions
    Warn,
    /// Informational messages
    Info,
    /// Debug-level messages
    Debug,
    /// Trace level (very verbose)
    Trace,
}

/// Log context categories for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogContext {
    /// Selection searches
    Selection,
    /// Reads from chain collaborators
    Chain,
    /// Request handling and responses
    Api,
    /// Configuration loading
    Config,
}

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level for all contexts
    #[serde(default = "default_level")]
    pub level: LogLevel,
    /// Whether to include timestamps in log messages
    #[serde(default = "default_true")]
    pub include_timestamps: bool,
    /// Whether to use JSON format for logs (machine-readable)
    #[serde(default)]
    pub json_format: bool,
    /// Emit search timings at debug level regardless of `level`
    #[serde(default)]
    pub benchmark: bool,
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            include_timestamps: true,
            json_format: false,
            benchmark: false,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

static LOGGING_INIT: Once = Once::new();

/// Initialize the logging system with the given configuration
///
/// Only the first call configures the logger; later calls return Ok.
///
/// # Arguments
/// * `config` - Configuration for the logging system
///
/// # Returns
/// * Result with () on success, error string on failure
pub fn init(config: &LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    LOGGING_INIT.call_once(|| {
        if let Err(e) = builder(config).try_init() {
            // Tests and embedding binaries may have installed a logger already.
            if e.to_string().contains("already initialized") {
                debug!("Logger already initialized, using existing instance");
            } else {
                result = Err(e.to_string());
            }
        }
    });

    result
}

/// env_logger builder for `config`
fn builder(config: &LogConfig) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(config.level.into());
    if config.benchmark {
        builder.filter_module(BENCHMARK_TARGET, LevelFilter::Debug);
    }

    let include_timestamps = config.include_timestamps;
    let json_format = config.json_format;
    builder.format(move |buf, record| {
        let timestamp =
            include_timestamps.then(|| Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string());

        if json_format {
            let line = json!({
                "timestamp": timestamp,
                "level": record.level().to_string(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            return writeln!(buf, "{}", line);
        }

        if let Some(timestamp) = &timestamp {
            write!(buf, "{} ", timestamp)?;
        }
        let mut style = buf.style();
        style.set_bold(true);
        writeln!(buf, "[{} {}] {}", style.value(record.level()), record.target(), record.args())
    });

    builder
}

/// Shorten an address or transaction id for logging
///
/// Keeps the first and last four characters; short values are masked.
pub fn sanitize_for_logging(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "*****".to_string();
    }

    let first: String = chars[..4].iter().collect();
    let last: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", first, last)
}

fn log_with_context(level: LogLevel, context: LogContext, message: &str, params: Option<serde_json::Value>) {
    match params {
        Some(params) => log::log!(level.into(), "[{:?}] {} - {}", context, message, params),
        None => log::log!(level.into(), "[{:?}] {}", context, message),
    }
}

/// Log a selection event
pub fn log_selection(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Selection, message, params);
}

/// Log a chain collaborator event
pub fn log_chain(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Chain, message, params);
}

/// Log a request handling event
pub fn log_api(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Api, message, params);
}

/// Log a configuration event
pub fn log_config(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Config, message, params);
}

/// Build a JSON object from name/value pairs
///
/// # Arguments
/// * `params` - Vector of (name, value) pairs
///
/// # Returns
/// A JSON value with all parameters
pub fn log_params(params: Vec<(&str, String)>) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, value) in params {
        map.insert(name.to_string(), serde_json::Value::String(value));
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging(""), "");
        assert_eq!(sanitize_for_logging("short"), "*****");
        assert_eq!(
            sanitize_for_logging("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"),
            "bc1q...5mdq"
        );
    }

    #[test]
    fn test_log_params() {
        let params = log_params(vec![("pages", "3".to_string()), ("strategy", "Random".to_string())]);
        assert_eq!(params["pages"], "3");
        assert_eq!(params["strategy"], "Random");
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::Warn);
        assert_eq!(log::Level::from(LogLevel::Trace), log::Level::Trace);
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(init(&LogConfig::default()).is_ok());
        assert!(init(&LogConfig::default()).is_ok());
    }

    #[test]
    fn test_benchmark_target_enabled_above_level() {
        use log::Log;

        let config = LogConfig {
            level: LogLevel::Warn,
            benchmark: true,
            ..LogConfig::default()
        };
        let logger = builder(&config).build();

        let timing = log::Metadata::builder()
            .level(log::Level::Debug)
            .target(BENCHMARK_TARGET)
            .build();
        let other = log::Metadata::builder()
            .level(log::Level::Debug)
            .target("utxo_matcher::api")
            .build();
        assert!(logger.enabled(&timing));
        assert!(!logger.enabled(&other));

        let quiet = builder(&LogConfig {
            level: LogLevel::Warn,
            ..LogConfig::default()
        })
        .build();
        assert!(!quiet.enabled(&timing));
    }

    #[test]
    fn test_config_defaults_from_empty_toml() {
        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config, LogConfig::default());
    }
}
