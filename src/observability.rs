//! Tracing setup and download counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Output goes to stderr so it never mixes with anything written to stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Counters for a single download run
#[derive(Debug, Default)]
pub struct Metrics {
    segments_completed: AtomicU64,
    segments_failed: AtomicU64,
    bytes_received: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment_completed(&self, bytes: u64) {
        self.segments_completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
        tracing::trace!(counter = "segments_completed", bytes, "Metric incremented");
    }

    pub fn segment_failed(&self) {
        self.segments_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "segments_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            segments_completed: self.segments_completed.load(Ordering::Relaxed),
            segments_failed: self.segments_failed.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub segments_completed: u64,
    pub segments_failed: u64,
    pub bytes_received: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.segment_completed(100);
        metrics.segment_completed(50);
        metrics.segment_failed();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                segments_completed: 2,
                segments_failed: 1,
                bytes_received: 150,
            }
        );
    }
}
