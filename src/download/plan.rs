use super::error::{DownloadError, Result};
use std::fmt;
use tracing::debug;

/// Inclusive byte range `[start, end]` of the resource, plus its position in
/// the assembled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Segment {
    /// Number of bytes covered; never zero for a planned segment.
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment {} [{}-{}]", self.index, self.start, self.end)
    }
}

/// Split `total_length` bytes into contiguous inclusive ranges, one per worker.
///
/// Every segment but the last spans `total_length / n` bytes; the last one
/// absorbs the remainder. When more workers are requested than there are
/// bytes, the count is clamped to `total_length` so that no segment is empty.
pub fn plan(total_length: u64, worker_count: usize) -> Result<Vec<Segment>> {
    if worker_count == 0 {
        return Err(DownloadError::InvalidWorkerCount {
            requested: 0,
            max: usize::MAX,
        });
    }
    if total_length == 0 {
        return Err(DownloadError::SizeUnknown);
    }

    let workers = (worker_count as u64).min(total_length);
    if workers < worker_count as u64 {
        debug!(
            requested = worker_count,
            effective = workers,
            total_length,
            "Clamped worker count to resource length"
        );
    }

    let base = total_length / workers;

    let segments = (0..workers)
        .map(|i| {
            let start = i * base;
            let end = if i == workers - 1 {
                total_length - 1
            } else {
                start + base - 1
            };
            Segment {
                index: i as usize,
                start,
                end,
            }
        })
        .collect();

    Ok(segments)
}
