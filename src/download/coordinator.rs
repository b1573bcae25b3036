//! Drives a download end to end: preflight, probe, plan, parallel fetch,
//! merge.

use super::error::{DownloadError, Result};
use super::fetch::{Chunk, fetch_segment};
use super::merge::merge;
use super::plan::{Segment, plan};
use super::probe::probe;
use crate::config::DownloadConfig;
use crate::humanize::ByteSize;
use crate::observability::{Metrics, MetricsSnapshot};
use crate::transport::Transport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Limits applied to every run
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Largest accepted worker count
    pub max_workers: usize,
    /// Largest accepted resource; the whole resource is held in memory
    pub max_resource_bytes: ByteSize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        DownloadOptions::from(&DownloadConfig::default())
    }
}

impl From<&DownloadConfig> for DownloadOptions {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            max_resource_bytes: config.max_resource_bytes,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub destination: PathBuf,
    pub total_bytes: u64,
    pub segments: usize,
    pub metrics: MetricsSnapshot,
}

pub struct Downloader {
    transport: Arc<dyn Transport>,
    options: DownloadOptions,
}

impl Downloader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            options: DownloadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Download `url` into `destination` using up to `worker_count`
    /// concurrent range requests.
    ///
    /// Either the complete resource ends up at `destination` or nothing
    /// does. An existing destination is rejected before any request is made.
    pub async fn run(
        &self,
        url: &str,
        worker_count: usize,
        destination: &Path,
    ) -> Result<DownloadReport> {
        if worker_count == 0 || worker_count > self.options.max_workers {
            return Err(DownloadError::InvalidWorkerCount {
                requested: worker_count,
                max: self.options.max_workers,
            });
        }

        let exists = tokio::fs::try_exists(destination)
            .await
            .map_err(DownloadError::DestinationCheck)?;
        if exists {
            return Err(DownloadError::DestinationExists(destination.to_path_buf()));
        }

        let resource = probe(self.transport.as_ref(), url).await?;

        let limit = self.options.max_resource_bytes;
        if resource.total_length > limit.as_u64() {
            return Err(DownloadError::ResourceTooLarge {
                length: ByteSize(resource.total_length),
                limit,
            });
        }

        let segments = plan(resource.total_length, worker_count)?;
        let segment_count = segments.len();

        info!(
            url,
            destination = %destination.display(),
            size = %ByteSize(resource.total_length),
            workers = segment_count,
            "Starting download"
        );

        let metrics = Metrics::new();
        let chunks = self.fetch_all(url, segments, &metrics).await?;

        let total_bytes = merge(chunks, destination).await?;

        info!(
            destination = %destination.display(),
            bytes = total_bytes,
            "Download complete"
        );

        Ok(DownloadReport {
            destination: destination.to_path_buf(),
            total_bytes,
            segments: segment_count,
            metrics: metrics.snapshot(),
        })
    }

    /// Fetch every segment concurrently and return the chunks in index
    /// order.
    ///
    /// Returns only once every worker has finished. The first failure
    /// aborts the workers still running and is returned as the cause.
    async fn fetch_all(
        &self,
        url: &str,
        segments: Vec<Segment>,
        metrics: &Metrics,
    ) -> Result<Vec<Chunk>> {
        let url: Arc<str> = Arc::from(url);
        let mut slots: Vec<Option<Chunk>> = vec![None; segments.len()];
        let mut workers = JoinSet::new();

        for segment in segments {
            let transport = Arc::clone(&self.transport);
            let url = Arc::clone(&url);
            workers.spawn(async move { fetch_segment(transport.as_ref(), &url, segment).await });
        }

        while let Some(joined) = workers.join_next().await {
            let failure = match joined {
                Ok(Ok(chunk)) => {
                    metrics.segment_completed(chunk.data.len() as u64);
                    let index = chunk.segment.index;
                    slots[index] = Some(chunk);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(e) => DownloadError::FetchFailed {
                    index: None,
                    reason: format!("worker task failed: {}", e),
                },
            };

            metrics.segment_failed();
            warn!(
                error = %failure,
                still_running = workers.len(),
                "Segment failed, cancelling remaining workers"
            );
            workers.shutdown().await;

            let snapshot = metrics.snapshot();
            warn!(
                segments_completed = snapshot.segments_completed,
                segments_failed = snapshot.segments_failed,
                bytes_received = snapshot.bytes_received,
                "Download aborted"
            );
            return Err(failure);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| DownloadError::FetchFailed {
                    index: Some(index),
                    reason: "worker finished without a result".to_string(),
                })
            })
            .collect()
    }
}
