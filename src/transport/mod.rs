//! Transport capability consumed by the download core.
//!
//! The core only ever issues two kinds of request: a metadata-only `HEAD` and
//! a ranged `GET`. Anything that can answer those (a real HTTP client, an
//! in-memory fixture) plugs in through [`Transport`].

pub mod http;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;
use thiserror::Error;

pub use http::HttpTransport;
pub use memory::{Fault, InMemoryTransport};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Failed to read body: {0}")]
    Body(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Response body delivered incrementally as it arrives.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Metadata returned by a `HEAD` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    /// Value of the `Content-Length` header, if the server sent one.
    pub content_length: Option<u64>,
}

/// Response to a ranged `GET`.
pub struct RangeResponse {
    pub status: u16,
    /// Raw `Content-Range` header, if the server sent one.
    pub content_range: Option<String>,
    pub body: BodyStream,
}

impl std::fmt::Debug for RangeResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeResponse")
            .field("status", &self.status)
            .field("content_range", &self.content_range)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Request response metadata only, without a body.
    async fn head(&self, url: &str) -> Result<HeadResponse>;

    /// Request the inclusive byte range `[start, end]` of the resource.
    async fn get_range(&self, url: &str, start: u64, end: u64) -> Result<RangeResponse>;
}

/// Value of the `Range` header for an inclusive byte range.
pub fn range_header(start: u64, end: u64) -> String {
    format!("bytes={}-{}", start, end)
}

/// Inclusive bounds of a `Content-Range: bytes start-end/total` value.
///
/// Returns `None` for unsatisfied (`bytes */total`) or malformed values.
pub fn parse_content_range(value: &str) -> Option<(u64, u64)> {
    let (unit, rest) = value.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (range, _total) = rest.trim().split_once('/')?;
    let (start, end) = range.split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    (start <= end).then_some((start, end))
}
