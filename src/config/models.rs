use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout, body included. Unset means no limit, since a
    /// single segment of a large resource can legitimately take a long time.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: None,
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("rangefetch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_redirects() -> usize {
    10
}

/// Download behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Worker count used when none is given on the command line
    #[serde(default = "default_workers")]
    pub default_workers: usize,
    /// Upper bound on concurrent range requests
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Largest resource accepted; every segment is buffered in memory
    #[serde(default = "default_max_resource_bytes")]
    pub max_resource_bytes: ByteSize,
    /// Output name used when the URL path has no final segment
    #[serde(default = "default_fallback_filename")]
    pub fallback_filename: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            default_workers: default_workers(),
            max_workers: default_max_workers(),
            max_resource_bytes: default_max_resource_bytes(),
            fallback_filename: default_fallback_filename(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_max_workers() -> usize {
    64
}

fn default_max_resource_bytes() -> ByteSize {
    ByteSize(4 * 1024 * 1024 * 1024) // 4 GB
}

fn default_fallback_filename() -> String {
    "downloaded_file".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.http.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.http.request_timeout(), None);
        assert!(config.http.user_agent.starts_with("rangefetch/"));
        assert_eq!(config.download.default_workers, 4);
        assert_eq!(config.download.max_workers, 64);
        assert_eq!(config.download.max_resource_bytes.as_u64(), 4 * 1024 * 1024 * 1024);
        assert_eq!(config.download.fallback_filename, "downloaded_file");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: Config = toml::from_str(
            r#"
[download]
max_workers = 8
max_resource_bytes = "256MB"
            "#,
        )
        .unwrap();

        assert_eq!(config.download.max_workers, 8);
        assert_eq!(config.download.default_workers, 4);
        assert_eq!(config.download.max_resource_bytes.as_u64(), 256 * 1024 * 1024);
        assert_eq!(config.http.max_redirects, 10);
    }
}
