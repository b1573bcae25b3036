use crate::humanize::ByteSize;
use crate::transport::TransportError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Point in the pipeline at which a download failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Argument and destination checks, before any network traffic
    Preflight,
    Probe,
    Fetch,
    Merge,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::Probe => "probe",
            Stage::Fetch => "fetch",
            Stage::Merge => "merge",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("worker count {requested} is outside the allowed range 1..={max}")]
    InvalidWorkerCount { requested: usize, max: usize },

    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("cannot check destination: {0}")]
    DestinationCheck(#[source] io::Error),

    #[error("remote server responded with HTTP {status}")]
    RemoteError { status: u16 },

    #[error("resource size unknown: Content-Length missing or zero")]
    SizeUnknown,

    #[error("resource of {length} exceeds the in-memory limit of {limit}")]
    ResourceTooLarge { length: ByteSize, limit: ByteSize },

    #[error("segment {index}: server ignored the range request (HTTP {status})")]
    RangeUnsupported { index: usize, status: u16 },

    #[error("segment {index}: expected {expected} bytes, received {actual}")]
    ShortRead {
        index: usize,
        expected: u64,
        actual: u64,
    },

    #[error("{}: {reason}", fetch_context(.index))]
    FetchFailed { index: Option<usize>, reason: String },

    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}

fn fetch_context(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("segment {} fetch failed", index),
        None => "size probe failed".to_string(),
    }
}

impl DownloadError {
    /// Transport failure while probing (`None`) or fetching segment `index`.
    pub fn transport(index: Option<usize>, err: TransportError) -> Self {
        DownloadError::FetchFailed {
            index,
            reason: err.to_string(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            DownloadError::InvalidUrl(_)
            | DownloadError::InvalidWorkerCount { .. }
            | DownloadError::DestinationExists(_)
            | DownloadError::DestinationCheck(_) => Stage::Preflight,
            DownloadError::RemoteError { .. }
            | DownloadError::SizeUnknown
            | DownloadError::ResourceTooLarge { .. }
            | DownloadError::FetchFailed { index: None, .. } => Stage::Probe,
            DownloadError::RangeUnsupported { .. }
            | DownloadError::ShortRead { .. }
            | DownloadError::FetchFailed { index: Some(_), .. } => Stage::Fetch,
            DownloadError::Write(_) => Stage::Merge,
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
