//! url-feed client tests
//!
//! Exercises both endpoints of the backend contract: the resolve call and
//! the manifest readiness probe.

use mockito::{Matcher, Server};
use urlcast::api::{UrlFeedClient, UrlFeedError};

// =============================================================================
// Resolve Endpoint Tests
// =============================================================================

/// Test: submit posts the URL as JSON and parses the thumbnail back
#[tokio::test]
async fn test_submit_success_with_thumbnail() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/url-feed/seeurl")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "url": "http://example.com/video"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "thumb_url": "http://x/thumb.jpg"}"#)
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    let outcome = client.submit("http://example.com/video").await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.thumb_url.as_deref(), Some("http://x/thumb.jpg"));
}

/// Test: a success response without a thumbnail is still a success
#[tokio::test]
async fn test_submit_success_without_thumbnail() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    let outcome = client.submit("http://example.com/video").await.unwrap();

    mock.assert_async().await;
    assert!(outcome.thumb_url.is_none());
}

/// Test: backend reporting success=false maps to Rejected
#[tokio::test]
async fn test_submit_rejected_by_backend() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false}"#)
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    let err = client.submit("not-a-video").await.unwrap_err();

    assert!(matches!(err, UrlFeedError::Rejected));
}

/// Test: non-2xx responses map to HttpStatus
#[tokio::test]
async fn test_submit_http_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(500)
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    let err = client.submit("http://example.com/video").await.unwrap_err();

    assert!(matches!(err, UrlFeedError::HttpStatus(500)));
}

/// Test: garbage in the response body maps to InvalidResponse
#[tokio::test]
async fn test_submit_invalid_json() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body("<html>proxy error</html>")
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    let err = client.submit("http://example.com/video").await.unwrap_err();

    assert!(matches!(err, UrlFeedError::InvalidResponse(_)));
}

/// Test: an unreachable backend maps to RequestFailed
#[tokio::test]
async fn test_submit_transport_error() {
    // Port 1 is never listening
    let client = UrlFeedClient::new("http://127.0.0.1:1");
    let err = client.submit("http://example.com/video").await.unwrap_err();

    assert!(matches!(err, UrlFeedError::RequestFailed(_)));
}

// =============================================================================
// Readiness Probe Tests
// =============================================================================

/// Test: a 2xx manifest response means ready
#[tokio::test]
async fn test_stream_ready_on_2xx() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(200)
        .with_header("content-type", "application/vnd.apple.mpegurl")
        .with_body("#EXTM3U\n#EXT-X-VERSION:3\n")
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    assert!(client.stream_ready().await);
    mock.assert_async().await;
}

/// Test: 404 means not ready yet, not an error
#[tokio::test]
async fn test_stream_not_ready_on_404() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(404)
        .create_async()
        .await;

    let client = UrlFeedClient::new(server.url());
    assert!(!client.stream_ready().await);
}

/// Test: network failure during a probe also reads as not ready
#[tokio::test]
async fn test_stream_not_ready_on_transport_error() {
    let client = UrlFeedClient::new("http://127.0.0.1:1");
    assert!(!client.stream_ready().await);
}

/// Test: the playback URL is the probed URL
#[tokio::test]
async fn test_stream_url_matches_probe_target() {
    let server = Server::new_async().await;
    let client = UrlFeedClient::new(server.url());
    assert_eq!(client.stream_url(), format!("{}/hls/stream.m3u8", server.url()));
}
