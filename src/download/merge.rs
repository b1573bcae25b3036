use super::error::{DownloadError, Result};
use super::fetch::Chunk;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write chunks to `destination` in segment order.
///
/// Data goes to a temporary file next to the destination, which is moved
/// into place only once everything has been written and synced. The move
/// never replaces an existing file. On any failure the temporary file is
/// removed and the destination is untouched.
///
/// Returns the number of bytes written.
pub async fn merge(chunks: Vec<Chunk>, destination: &Path) -> Result<u64> {
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || merge_blocking(chunks, destination))
        .await
        .map_err(|e| DownloadError::Write(io::Error::other(e)))?
}

fn merge_blocking(mut chunks: Vec<Chunk>, destination: PathBuf) -> Result<u64> {
    chunks.sort_by_key(|chunk| chunk.segment.index);
    check_contiguous(&chunks)?;

    let mut staging = tempfile::Builder::new()
        .prefix(".rangefetch-")
        .suffix(".part")
        .tempfile_in(staging_dir(&destination))
        .map_err(DownloadError::Write)?;

    let mut written = 0u64;
    {
        let mut writer = BufWriter::new(staging.as_file_mut());
        // Consuming the chunks frees each buffer as soon as it is written.
        for chunk in chunks {
            writer.write_all(&chunk.data).map_err(DownloadError::Write)?;
            written += chunk.data.len() as u64;
            debug!(index = chunk.segment.index, bytes = chunk.data.len(), "Merged chunk");
        }
        writer.flush().map_err(DownloadError::Write)?;
    }
    staging.as_file().sync_all().map_err(DownloadError::Write)?;

    staging.persist_noclobber(&destination).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            DownloadError::DestinationExists(destination.clone())
        } else {
            DownloadError::Write(e.error)
        }
    })?;

    Ok(written)
}

fn staging_dir(destination: &Path) -> &Path {
    destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Chunks sorted by index must tile the resource from byte 0 with no gap or
/// overlap, each holding exactly its segment's bytes.
fn check_contiguous(chunks: &[Chunk]) -> Result<()> {
    let mut next_start = 0u64;

    for chunk in chunks {
        let segment = chunk.segment;
        if segment.start != next_start || chunk.data.len() as u64 != segment.size() {
            return Err(DownloadError::Write(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} does not continue at byte {}", segment, next_start),
            )));
        }
        next_start = segment.end + 1;
    }

    Ok(())
}
