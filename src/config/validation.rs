use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Timeout must be positive: {field} = {value}")]
    InvalidTimeout { field: &'static str, value: u64 },

    #[error("max_workers must be at least 1")]
    NoWorkersAllowed,

    #[error("default_workers ({default_workers}) must be between 1 and max_workers ({max_workers})")]
    InvalidDefaultWorkers {
        default_workers: usize,
        max_workers: usize,
    },

    #[error("max_resource_bytes must be positive")]
    InvalidResourceLimit,

    #[error("fallback_filename must be a bare, non-empty file name: {0:?}")]
    InvalidFallbackFilename(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_http(config)?;
    validate_workers(config)?;
    validate_download(config)?;
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.connect_timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "connect_timeout_secs",
            value: 0,
        });
    }

    if config.http.request_timeout_secs == Some(0) {
        return Err(ValidationError::InvalidTimeout {
            field: "request_timeout_secs",
            value: 0,
        });
    }

    Ok(())
}

fn validate_workers(config: &Config) -> Result<(), ValidationError> {
    let download = &config.download;

    if download.max_workers == 0 {
        return Err(ValidationError::NoWorkersAllowed);
    }

    if download.default_workers == 0 || download.default_workers > download.max_workers {
        return Err(ValidationError::InvalidDefaultWorkers {
            default_workers: download.default_workers,
            max_workers: download.max_workers,
        });
    }

    Ok(())
}

fn validate_download(config: &Config) -> Result<(), ValidationError> {
    if config.download.max_resource_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidResourceLimit);
    }

    let name = config.download.fallback_filename.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ValidationError::InvalidFallbackFilename(
            config.download.fallback_filename.clone(),
        ));
    }

    Ok(())
}
