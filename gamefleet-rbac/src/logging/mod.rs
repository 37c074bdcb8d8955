//! Gamefleet logging
//!
//! Everything logs through the standard `log` macros; this module only
//! installs the `env_logger` backend from a [`LoggingConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use gamefleet_rbac::logging::{LoggingConfig, LogLevel};
//!
//! let config = LoggingConfig::default().with_level(LogLevel::Debug);
//! gamefleet_rbac::logging::init_logging(&config);
//!
//! log::info!("RBAC engine ready");
//! ```

pub mod config;

pub use config::{LogFormat, LogLevel, LoggingConfig};

use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging
///
/// Only the first call installs a logger; later calls are ignored, as is a
/// logger installed by someone else. `RUST_LOG`, when set, overrides the
/// configured levels.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        if let Err(e) = build_logger(config).try_init() {
            eprintln!("Logger already initialised: {}", e);
        }
    });
}

fn build_logger(config: &LoggingConfig) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level.into());
    for (module, level) in &config.module_levels {
        builder.filter_module(module, (*level).into());
    }

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    if config.format == LogFormat::Compact {
        builder.format(|buf, record| {
            writeln!(buf, "{} {}: {}", record.level(), record.target(), record.args())
        });
    }

    builder
}
