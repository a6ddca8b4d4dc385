//! Logging bootstrap shared by richerror binaries.
//!
//! ```ignore
//! let mut log_config = LogConfig::from_env("info").with_stderr();
//! if verbose {
//!     log_config = log_config.with_level("debug");
//! }
//! let _logging_guards = init_logging(&log_config)?;
//! ```

use crate::config::{EnvError, EnvParser};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Console output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::InvalidFormat(other.to_string())),
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("invalid log format '{0}' (expected pretty, compact or json)")]
    InvalidFormat(String),

    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level or full `EnvFilter` directive.
    pub level: String,
    pub format: LogFormat,
    /// Write human-readable output to stderr.
    pub stderr: bool,
    /// Directory for a daily-rolling JSON log file.
    pub log_dir: Option<PathBuf>,
    /// File name prefix inside `log_dir`.
    pub file_prefix: String,
    /// Invalid `RICHERROR_LOG_*` values that were replaced by defaults.
    /// Logged as warnings once the subscriber is installed.
    pub env_errors: Vec<EnvError>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            stderr: false,
            log_dir: None,
            file_prefix: "richerror.log".to_string(),
            env_errors: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Reads `RICHERROR_LOG_LEVEL`, `RICHERROR_LOG_FORMAT`,
    /// `RICHERROR_LOG_STDERR` and `RICHERROR_LOG_DIR`. Invalid values fall
    /// back to the defaults and are kept in `env_errors`.
    pub fn from_env(default_level: &str) -> Self {
        Self::from_parser(&mut EnvParser::new(), default_level)
    }

    /// Like [`LogConfig::from_env`]. Takes every error accumulated on
    /// `parser` so far.
    pub fn from_parser(parser: &mut EnvParser, default_level: &str) -> Self {
        let level = parser.get_log_level("LOG_LEVEL", default_level).into_inner();
        let format_var = parser.get_string("LOG_FORMAT", "pretty");
        let stderr = parser.get_bool("LOG_STDERR", false).into_inner();
        let log_dir = parser.get_optional_string("LOG_DIR").into_inner().map(PathBuf::from);

        let mut env_errors = parser.take_errors();
        let format = match format_var.value.parse() {
            Ok(format) => format,
            Err(_) => {
                env_errors.push(EnvError::InvalidValue {
                    var: format_var.env_var.unwrap_or_default(),
                    expected: "log format (pretty, compact, json)".to_string(),
                    value: format_var.value,
                });
                LogFormat::default()
            }
        };
        Self {
            level,
            format,
            stderr,
            log_dir,
            env_errors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// The `EnvFilter` for this config; `RUST_LOG` wins when set.
    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            filter: self.level.clone(),
            reason: e.to_string(),
        })
    }
}

/// Keeps the non-blocking writers flushing until dropped.
#[must_use = "dropping the guards stops file logging"]
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

/// Installs the global tracing subscriber described by `config`.
///
/// # Errors
///
/// Fails on an invalid filter, an uncreatable log directory, or when a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards, LoggingError> {
    let filter = config.filter()?;
    let mut guards = Vec::new();

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    let stderr_layer = config.stderr.then(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        match config.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    for error in &config.env_errors {
        tracing::warn!(error = %error, "ignoring invalid logging setting");
    }

    Ok(LoggingGuards { _guards: guards })
}
