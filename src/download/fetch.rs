use super::error::{DownloadError, Result};
use super::plan::Segment;
use crate::transport::{Transport, parse_content_range};
use futures_util::TryStreamExt;
use tracing::{info, warn};

const PARTIAL_CONTENT: u16 = 206;

/// Bytes of one segment, held in memory until merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub segment: Segment,
    pub data: Vec<u8>,
}

/// Fetch one segment with a ranged GET and buffer its body.
///
/// The server must answer `206 Partial Content`; any other 2xx means the
/// range was ignored. A `Content-Range` header, when present, must name
/// exactly the requested bounds. The buffer grows as data arrives and must end up
/// exactly `segment.size()` bytes long.
pub async fn fetch_segment(transport: &dyn Transport, url: &str, segment: Segment) -> Result<Chunk> {
    let index = segment.index;

    let response = transport
        .get_range(url, segment.start, segment.end)
        .await
        .map_err(|e| DownloadError::transport(Some(index), e))?;

    match response.status {
        PARTIAL_CONTENT => {}
        status @ 200..=299 => return Err(DownloadError::RangeUnsupported { index, status }),
        status => {
            return Err(DownloadError::FetchFailed {
                index: Some(index),
                reason: format!("HTTP {}", status),
            });
        }
    }

    if let Some(value) = response.content_range.as_deref() {
        if parse_content_range(value) != Some((segment.start, segment.end)) {
            warn!(index, content_range = value, "Server answered a different range");
            return Err(DownloadError::RangeUnsupported {
                index,
                status: PARTIAL_CONTENT,
            });
        }
    }

    let expected = segment.size();
    let mut data = Vec::new();
    let mut body = response.body;

    while let Some(bytes) = body
        .try_next()
        .await
        .map_err(|e| DownloadError::transport(Some(index), e))?
    {
        let received = (data.len() + bytes.len()) as u64;
        if received > expected {
            return Err(DownloadError::ShortRead {
                index,
                expected,
                actual: received,
            });
        }
        data.extend_from_slice(&bytes);
    }

    if data.len() as u64 != expected {
        return Err(DownloadError::ShortRead {
            index,
            expected,
            actual: data.len() as u64,
        });
    }

    info!(
        index,
        start = segment.start,
        end = segment.end,
        bytes = data.len(),
        "Chunk downloaded"
    );

    Ok(Chunk { segment, data })
}
