//! Mock server helpers for feed and download testing

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xenia_manager_versions::Variant;

use super::constants::*;

fn releases_path(variant: Variant) -> String {
    format!("/repos/{}/{}/releases", variant.owner(), variant.repo())
}

/// Serve `release` as the variant's latest release
pub async fn mock_latest_release(server: &MockServer, variant: Variant, release: &Value) {
    Mock::given(method("GET"))
        .and(path(format!("{}/latest", releases_path(variant))))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve `release` under its tag
pub async fn mock_tagged_release(server: &MockServer, variant: Variant, release: &Value) {
    let tag = release["tag_name"].as_str().unwrap_or_default();
    Mock::given(method("GET"))
        .and(path(format!("{}/tags/{}", releases_path(variant), tag)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve `release` under an already percent-encoded tag path segment
pub async fn mock_tagged_release_encoded(
    server: &MockServer,
    variant: Variant,
    encoded_tag: &str,
    release: &Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("{}/tags/{}", releases_path(variant), encoded_tag)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve the release list
pub async fn mock_release_list(server: &MockServer, variant: Variant, releases: &[Value]) {
    Mock::given(method("GET"))
        .and(path(releases_path(variant)))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(server)
        .await;
}

/// Answer any feed path of the variant with `status`
pub async fn mock_feed_status(server: &MockServer, variant: Variant, suffix: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{}{}", releases_path(variant), suffix)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve an asset body
pub async fn mock_download(server: &MockServer, name: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(download_path(name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Serve an asset body after `delay`
pub async fn mock_slow_download(
    server: &MockServer,
    name: &str,
    content: &[u8],
    delay: std::time::Duration,
) {
    Mock::given(method("GET"))
        .and(path(download_path(name)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Fail an asset download with `status`
pub async fn mock_failing_download(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(download_path(name)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve `content` once over a bare HTTP/1.1 connection that announces no
/// Content-Length and ends the body by closing; returns the URL
pub async fn serve_without_length(content: Vec<u8>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        socket.write_all(&content).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}/{}", addr, CANARY_ZIP)
}
