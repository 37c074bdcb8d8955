//! Logging configuration structures for declarative setup

use std::fmt;
use std::str::FromStr;

/// Main logging configuration
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Minimum log level to capture
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Per-module overrides, e.g. `("gamefleet_rbac::cache", Debug)`
    pub module_levels: Vec<(String, LogLevel)>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info, format: LogFormat::Human, module_levels: Vec::new() }
    }
}

/// Log levels in order of severity (compatible with standard log crate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Critical errors that may cause the application to abort
    Error,
    /// Warning conditions that should be investigated
    Warn,
    /// Informational messages about normal operation
    Info,
    /// Detailed information for debugging
    Debug,
    /// Very detailed information for deep debugging
    Trace,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Trace => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: log::Level = s.parse().map_err(|_| anyhow::anyhow!("unknown log level: {}", s))?;
        Ok(level.into())
    }
}

/// How log lines are rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Timestamped, multi-field lines (development default)
    /// Example: [2024-01-15T10:30:00Z INFO  gamefleet_rbac::rbac::engine] Set roles ["admin"] to user 1
    Human,

    /// Level, target and message only
    /// Example: INFO gamefleet_rbac::rbac::engine: Set roles ["admin"] to user 1
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "compact" => Ok(LogFormat::Compact),
            other => anyhow::bail!("unknown log format: {}", other),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Human => f.write_str("human"),
            LogFormat::Compact => f.write_str("compact"),
        }
    }
}

impl LoggingConfig {
    /// Create a development-friendly logging configuration
    pub fn development() -> Self {
        Self { level: LogLevel::Debug, format: LogFormat::Human, module_levels: Vec::new() }
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the level for one module path
    pub fn with_module_level(mut self, module: &str, level: LogLevel) -> Self {
        self.module_levels.push((module.to_string(), level));
        self
    }
}
