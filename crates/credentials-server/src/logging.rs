//! Logging setup

use std::str::FromStr;

use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Logging section of the server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit one JSON object per line
    pub json: bool,
    /// Include file and line information
    pub file_info: bool,
    /// Log span open/close events
    pub log_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_info: false,
            log_spans: false,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` directives are honoured on top
/// of the configured level.
pub fn setup_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    let installed = if config.json {
        builder.json().with_writer(std::io::stdout).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| LoggingError::Install(e.to_string()))
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> Result<Level, LoggingError> {
    Level::from_str(level.trim()).map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

/// Log a welcome message with version info
pub fn log_welcome(app_name: &str, version: &str) {
    tracing::info!("Starting {} v{}", app_name, version);
}
