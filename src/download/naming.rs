use super::error::{DownloadError, Result};
use percent_encoding::percent_decode_str;
use reqwest::Url;

/// Derive an output file name from the last path segment of `url`.
///
/// The segment is percent-decoded and any path separators it decodes to are
/// replaced, so the result is always a bare file name. `fallback` is used
/// when the path ends in `/`, is empty, or names `.`/`..`.
pub fn filename_from_url(url: &str, fallback: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DownloadError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            parsed.scheme(),
            url
        )));
    }

    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().replace(['/', '\\'], "_"))
        .filter(|name| !name.trim().is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| fallback.to_string());

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "downloaded_file";

    fn name(url: &str) -> String {
        filename_from_url(url, FALLBACK).unwrap()
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(name("https://example.com/releases/archive.tar.gz"), "archive.tar.gz");
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(name("https://example.com/image.png?id=123&q=high#top"), "image.png");
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(name("https://example.com/my%20photo.jpg"), "my photo.jpg");
        assert_eq!(name("https://example.com/a%2Fb.txt"), "a_b.txt");
    }

    #[test]
    fn test_fallback_when_no_segment() {
        assert_eq!(name("https://example.com/"), FALLBACK);
        assert_eq!(name("https://example.com"), FALLBACK);
        assert_eq!(name("https://example.com/files/"), FALLBACK);
    }

    #[test]
    fn test_rejects_unparseable_and_non_http() {
        assert!(matches!(
            filename_from_url("not a url", FALLBACK),
            Err(DownloadError::InvalidUrl(_))
        ));
        assert!(matches!(
            filename_from_url("ftp://example.com/file.bin", FALLBACK),
            Err(DownloadError::InvalidUrl(_))
        ));
    }
}
