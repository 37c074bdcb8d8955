//! Configuration system for Gamefleet
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **Environment Variables**
//! 2. **Config File** (gamefleet.toml)
//! 3. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use gamefleet_rbac::config::GamefleetConfig;
//!
//! let config = GamefleetConfig::load()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod logging;
pub mod rbac;

pub use logging::LoggingSection;
pub use rbac::RbacConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete Gamefleet configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamefleetConfig {
    pub rbac: RbacConfig,
    pub logging: LoggingSection,
}

impl GamefleetConfig {
    /// Load `gamefleet.toml` from the working directory with full supersedence
    pub fn load() -> Result<Self> {
        Self::load_from("gamefleet.toml")
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.rbac.merge(other.rbac);
        self.logging.merge(other.logging);
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) {
        self.rbac.apply_env_vars();
        self.logging.apply_env_vars();
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.rbac.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
