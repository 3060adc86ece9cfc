//! Tracing subscriber setup for the binary
//!
//! `RUST_LOG` wins over the configured level. Output goes to stderr so
//! command output on stdout stays clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::config::LoggingConfig;
use crate::errors::{RagError, Result};

/// Filter from `RUST_LOG`, or from the configured level for this crate
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(default_directive(&config.level))
        .map_err(|e| RagError::ConfigError(format!("Invalid log level '{}': {}", config.level, e)))
}

/// `level` for this crate, warnings only for dependencies
fn default_directive(level: &str) -> String {
    format!("warn,grcrag={}", level)
}

/// Install the global subscriber; a second call is an error
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| RagError::ConfigError(format!("Failed to install logger: {}", e)))
}
