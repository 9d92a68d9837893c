//! Structured logging setup
//!
//! Console events go to stderr so that JSON written to stdout by the CLI
//! stays machine-readable. Imports and store writes can additionally be kept
//! as a JSON-lines audit trail in a rotating log directory.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable holding filter directives, overrides the configured level
pub const LOG_ENV_VAR: &str = "FATIGUE_GUARD_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Console output format
    pub format: LogFormat,
    /// JSON-lines audit log, console only when absent
    pub file: Option<LogFileConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            file: None,
        }
    }
}

/// Where and how often the audit log rolls over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFileConfig {
    pub directory: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub rotation: LogRotation,
}

fn default_file_prefix() -> String {
    "fatigue-guard".to_string()
}

impl LogFileConfig {
    fn appender(&self) -> anyhow::Result<RollingFileAppender> {
        std::fs::create_dir_all(&self.directory)?;
        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.into())
            .filename_prefix(&self.prefix)
            .filename_suffix("log")
            .build(&self.directory)?;
        Ok(appender)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Verbosity, from quietest to loudest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ORDER: [LogLevel; 5] = [LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug, LogLevel::Trace];

    /// Level for a repeated `-v` flag on top of the configured one
    pub fn raised_by(self, steps: u8) -> Self {
        let current = self as usize;
        Self::ORDER[(current + usize::from(steps)).min(Self::ORDER.len() - 1)]
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, for reading at a terminal
    Pretty,
    Json,
    /// One line per event without timestamps
    Compact,
}

/// Only this crate's events, at the configured level
fn default_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), LevelFilter::from(level)))
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed or the log directory cannot
/// be created.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| default_filter(config.level));

    let console = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().without_time().with_writer(io::stderr).boxed(),
    };

    let audit = match &config.file {
        Some(file) => Some(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(file.appender()?),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(audit)
        .try_init()?;

    tracing::debug!(level = ?config.level, format = ?config.format, audit_log = config.file.is_some(), "Logging initialized");
    Ok(())
}
