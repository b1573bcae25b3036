//! HTTP transport backed by reqwest

use super::{BodyStream, HeadResponse, RangeResponse, Result, Transport, TransportError};
use crate::config::HttpConfig;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use tracing::debug;

/// Production transport.
///
/// reqwest follows redirects itself (bounded by `max_redirects`), so a probe
/// against a redirecting URL reports the final target's metadata.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        // One connection per in-flight range request, never multiplexed.
        let mut builder = Client::builder()
            .http1_only()
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    fn map_error(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_redirect() {
            TransportError::TooManyRedirects
        } else if e.is_builder() {
            TransportError::InvalidUrl(e.to_string())
        } else {
            TransportError::RequestFailed(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn head(&self, url: &str) -> Result<HeadResponse> {
        debug!(url, "Sending HEAD request");

        let response = self.client.head(url).send().await.map_err(Self::map_error)?;

        // Read the header directly: for HEAD responses the body size hint is
        // zero regardless of what the server advertised.
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        Ok(HeadResponse {
            status: response.status().as_u16(),
            content_length,
        })
    }

    async fn get_range(&self, url: &str, start: u64, end: u64) -> Result<RangeResponse> {
        let response = self
            .client
            .get(url)
            .header(RANGE, super::range_header(start, end))
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = response.status().as_u16();
        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(url, start, end, status, ?content_range, "Range request answered");

        let body: BodyStream = Box::pin(response.bytes_stream().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        }));

        Ok(RangeResponse {
            status,
            content_range,
            body,
        })
    }
}
