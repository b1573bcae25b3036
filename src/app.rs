use crate::cli::Cli;
use rangefetch::config::{Config, ConfigError};
use rangefetch::download::{self, DownloadError, DownloadOptions, DownloadReport, Downloader};
use rangefetch::transport::{HttpTransport, TransportError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] TransportError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl AppError {
    /// Short name of the failing stage, for diagnostics
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::Config(_) | AppError::Client(_) => "config",
            AppError::Download(e) => e.stage().as_str(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<DownloadReport, AppError> {
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    // Parsed even when --output is given, so a bad URL fails before any I/O.
    let derived = download::filename_from_url(&cli.url, &config.download.fallback_filename)?;
    let destination = cli.output.unwrap_or_else(|| PathBuf::from(derived));
    let workers = cli.threads.unwrap_or(config.download.default_workers);

    debug!(url = %cli.url, destination = %destination.display(), workers, "Resolved invocation");

    let transport = HttpTransport::new(&config.http)?;
    let downloader = Downloader::new(Arc::new(transport))
        .with_options(DownloadOptions::from(&config.download));

    Ok(downloader.run(&cli.url, workers, &destination).await?)
}
