//! End-to-end tests over real HTTP
//!
//! A wiremock server plays the remote host: it answers `HEAD` with the
//! resource length and each ranged `GET` with the matching slice. The
//! downloader runs against it through the reqwest transport.

use rangefetch::config::HttpConfig;
use rangefetch::download::{DownloadError, Downloader, Stage, plan};
use rangefetch::transport::HttpTransport;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE_PATH: &str = "/files/payload.bin";

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 253) as u8).collect()
}

fn downloader() -> Downloader {
    let transport = HttpTransport::new(&HttpConfig::default()).expect("Failed to build transport");
    Downloader::new(Arc::new(transport))
}

async fn mount_head(server: &MockServer, data: &[u8]) {
    Mock::given(method("HEAD"))
        .and(path(FILE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Length", data.len().to_string().as_str())
                .set_body_bytes(data.to_vec()),
        )
        .mount(server)
        .await;
}

/// Serve every planned range of `data` with a proper partial response.
async fn mount_ranges(server: &MockServer, data: &[u8], workers: usize) {
    for segment in plan(data.len() as u64, workers).unwrap() {
        let body = data[segment.start as usize..=segment.end as usize].to_vec();
        Mock::given(method("GET"))
            .and(path(FILE_PATH))
            .and(header(
                "Range",
                format!("bytes={}-{}", segment.start, segment.end).as_str(),
            ))
            .respond_with(
                ResponseTemplate::new(206)
                    .insert_header(
                        "Content-Range",
                        format!("bytes {}-{}/{}", segment.start, segment.end, data.len())
                            .as_str(),
                    )
                    .set_body_bytes(body),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

fn url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), FILE_PATH)
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_parallel_download_reassembles_resource() {
    let server = MockServer::start().await;
    let data = payload(300_000);
    mount_head(&server, &data).await;
    mount_ranges(&server, &data, 3).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("payload.bin");

    let report = downloader()
        .run(&url(&server), 3, &destination)
        .await
        .expect("download failed");

    assert_eq!(report.total_bytes, 300_000);
    assert_eq!(report.segments, 3);
    assert_eq!(std::fs::read(&destination).unwrap(), data);
}

#[tokio::test]
async fn test_range_requests_use_http1() {
    let server = MockServer::start().await;
    let data = payload(4096);
    mount_head(&server, &data).await;
    mount_ranges(&server, &data, 4).await;

    let dir = TempDir::new().unwrap();
    downloader()
        .run(&url(&server), 4, &dir.path().join("payload.bin"))
        .await
        .expect("download failed");

    // HTTP/2 carries the authority as a pseudo-header, never as `Host`
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|r| r.headers.contains_key("host")));
}

#[tokio::test]
async fn test_mislabelled_partial_content_leaves_no_output() {
    let server = MockServer::start().await;
    let data = b"HelloWorld".to_vec();
    mount_head(&server, &data).await;

    Mock::given(method("GET"))
        .and(header("Range", "bytes=0-4"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "bytes 0-4/10")
                .set_body_bytes(b"Hello".to_vec()),
        )
        .mount(&server)
        .await;

    // Right length, wrong bytes
    Mock::given(method("GET"))
        .and(header("Range", "bytes=5-9"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "bytes 0-4/10")
                .set_body_bytes(b"Hello".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader()
        .run(&url(&server), 2, &dir.path().join("hello.txt"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::RangeUnsupported { index: 1, status: 206 }
    ));
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_more_workers_than_bytes() {
    let server = MockServer::start().await;
    let data = b"HelloWorld".to_vec();
    mount_head(&server, &data).await;
    mount_ranges(&server, &data, 10).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("hello.txt");

    let report = downloader()
        .run(&url(&server), 32, &destination)
        .await
        .expect("download failed");

    assert_eq!(report.segments, 10);
    assert_eq!(std::fs::read(&destination).unwrap(), b"HelloWorld");
}

#[tokio::test]
async fn test_server_ignoring_ranges_leaves_no_output() {
    let server = MockServer::start().await;
    let data = b"HelloWorld".to_vec();
    mount_head(&server, &data).await;

    Mock::given(method("GET"))
        .and(header("Range", "bytes=0-4"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(b"Hello".to_vec()))
        .mount(&server)
        .await;

    // Second range answered with the whole file and a 200
    Mock::given(method("GET"))
        .and(header("Range", "bytes=5-9"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(data.clone()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("hello.txt");

    let err = downloader()
        .run(&url(&server), 2, &destination)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::RangeUnsupported { index: 1, status: 200 }
    ));
    assert_eq!(err.stage(), Stage::Fetch);
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_missing_resource_is_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("missing.bin");

    let err = downloader()
        .run(&url(&server), 4, &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::RemoteError { status: 404 }));
    assert_eq!(err.stage(), Stage::Probe);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() == "HEAD"));
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_existing_destination_sends_no_requests() {
    let server = MockServer::start().await;
    let data = payload(1024);
    mount_head(&server, &data).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("payload.bin");
    std::fs::write(&destination, b"already here").unwrap();

    let err = downloader()
        .run(&url(&server), 4, &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::DestinationExists(_)));
    assert_eq!(err.stage(), Stage::Preflight);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(std::fs::read(&destination).unwrap(), b"already here");
}

#[tokio::test]
async fn test_unreachable_host_fails_probe() {
    // Bind and drop a server to get a port nothing listens on
    let address = {
        let server = MockServer::start().await;
        server.uri()
    };

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("nothing.bin");

    let err = downloader()
        .run(&format!("{}{}", address, FILE_PATH), 2, &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::FetchFailed { index: None, .. }));
    assert!(is_empty_dir(dir.path()));
}
