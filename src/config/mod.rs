//! Configuration management for rangefetch
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use rangefetch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Default workers: {}", config.download.default_workers);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `RANGEFETCH__<section>__<key>`:
//! - `RANGEFETCH__DOWNLOAD__MAX_WORKERS=16`
//! - `RANGEFETCH__DOWNLOAD__MAX_RESOURCE_BYTES=512MB`
//! - `RANGEFETCH__HTTP__REQUEST_TIMEOUT_SECS=900`
//!
//! # Configuration File
//!
//! Read from `config/rangefetch.toml` unless `RANGEFETCH_CONFIG` points
//! elsewhere. A missing file is not an error.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, DownloadConfig, HttpConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring the
    /// environment overrides.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
