use super::error::{DownloadError, Result};
use crate::transport::Transport;
use tracing::{debug, warn};

/// What the probe learned about the remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: String,
    pub total_length: u64,
}

/// Discover the resource length with a metadata-only request.
///
/// Nothing is fetched until this succeeds.
pub async fn probe(transport: &dyn Transport, url: &str) -> Result<Resource> {
    let response = transport
        .head(url)
        .await
        .map_err(|e| DownloadError::transport(None, e))?;

    if !(200..300).contains(&response.status) {
        warn!(url, status = response.status, "Size probe rejected");
        return Err(DownloadError::RemoteError {
            status: response.status,
        });
    }

    match response.content_length {
        Some(total_length) if total_length > 0 => {
            debug!(url, total_length, "Size probe succeeded");
            Ok(Resource {
                url: url.to_string(),
                total_length,
            })
        }
        _ => Err(DownloadError::SizeUnknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;

    #[tokio::test]
    async fn test_probe_reports_length() {
        let transport = InMemoryTransport::new(vec![7u8; 4096]);

        let resource = probe(&transport, "mem://file.bin").await.unwrap();
        assert_eq!(
            resource,
            Resource {
                url: "mem://file.bin".to_string(),
                total_length: 4096,
            }
        );
        assert_eq!(transport.head_calls(), 1);
        assert_eq!(transport.range_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_remote_error() {
        let transport = InMemoryTransport::new(vec![0u8; 16]).with_head_status(404);

        assert!(matches!(
            probe(&transport, "mem://missing").await,
            Err(DownloadError::RemoteError { status: 404 })
        ));
    }

    #[tokio::test]
    async fn test_missing_length_is_size_unknown() {
        let transport = InMemoryTransport::new(vec![0u8; 16]).without_content_length();

        assert!(matches!(
            probe(&transport, "mem://chunked").await,
            Err(DownloadError::SizeUnknown)
        ));
    }

    #[tokio::test]
    async fn test_zero_length_is_size_unknown() {
        let transport = InMemoryTransport::new(Vec::new());

        assert!(matches!(
            probe(&transport, "mem://empty").await,
            Err(DownloadError::SizeUnknown)
        ));
    }
}
