//! Logging configuration

use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// `[logging]` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Minimum level: error, warn, info, debug or trace
    /// Env: GAMEFLEET_LOG_LEVEL
    /// Default: "info"
    pub level: String,

    /// Output format: human or compact
    /// Env: GAMEFLEET_LOG_FORMAT
    /// Default: "human"
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "human".to_string() }
    }
}

impl LoggingSection {
    pub fn merge(&mut self, other: Self) {
        self.level = other.level;
        self.format = other.format;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("GAMEFLEET_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("GAMEFLEET_LOG_FORMAT") {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.to_logging_config().map(|_| ())
    }

    /// Build the runtime logging configuration
    pub fn to_logging_config(&self) -> Result<LoggingConfig> {
        let level: LogLevel = self.level.parse().context("Invalid logging level")?;
        let format: LogFormat = self.format.parse().context("Invalid logging format")?;
        Ok(LoggingConfig::default().with_level(level).with_format(format))
    }
}
