//! Playback session flow tests
//!
//! Drives the real session task against a mock backend and a recording
//! player, with short poll intervals so whole waits fit in milliseconds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockito::Server;
use tokio::sync::watch;
use urlcast::api::UrlFeedClient;
use urlcast::models::FailureKind;
use urlcast::session::{PlaybackSession, ReleaseHook, SessionOptions, SessionView};
use urlcast::stream::{MediaPlayer, PlayerError};

// =============================================================================
// Test Doubles
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum PlayerCall {
    Reset,
    SetSource(String, String),
    Play,
}

/// Player that records every call it receives.
#[derive(Clone, Default)]
struct RecordingPlayer {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
}

impl RecordingPlayer {
    fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn play_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PlayerCall::Play))
            .count()
    }
}

impl MediaPlayer for RecordingPlayer {
    fn reset(&mut self) {
        self.calls.lock().unwrap().push(PlayerCall::Reset);
    }

    fn set_source(&mut self, url: &str, media_type: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(PlayerCall::SetSource(url.into(), media_type.into()));
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.calls.lock().unwrap().push(PlayerCall::Play);
        Ok(())
    }
}

/// Release hook that records whether it fired.
struct RecordingHook(Arc<AtomicBool>);

impl ReleaseHook for RecordingHook {
    fn release(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn fast_options() -> SessionOptions {
    SessionOptions {
        poll_interval: Duration::from_millis(10),
        max_poll_attempts: 20,
    }
}

async fn wait_for(
    rx: &mut watch::Receiver<SessionView>,
    what: &str,
    pred: impl Fn(&SessionView) -> bool,
) -> SessionView {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if pred(&rx.borrow()) {
                return rx.borrow().clone();
            }
            rx.changed().await.expect("session task ended early");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {}", what))
}

// =============================================================================
// Resolve Failure Flows
// =============================================================================

/// Test: submit with backend returning success=false ends Stopped and no
/// poll ever starts (Scenario D)
#[tokio::test]
async fn test_resolve_rejection_is_terminal() {
    let mut server = Server::new_async().await;

    let _post = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body(r#"{"success": false}"#)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new(server.url()), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.submit("not-a-video");
    let view = wait_for(&mut rx, "stopped status", |v| {
        v.status.is_stopped() && v.failure.is_some()
    })
    .await;

    assert_eq!(view.failure, Some(FailureKind::ResolveFailed));
    assert!(view.thumbnail_url.is_empty());
    assert_eq!(player.play_count(), 0);

    // Give a would-be poll loop time to fire, then verify it never did
    tokio::time::sleep(Duration::from_millis(50)).await;
    get.assert_async().await;

    session.shutdown();
    session.join().await;
}

/// Test: a transport error on resolve behaves the same as a rejection
#[tokio::test]
async fn test_resolve_transport_error_is_terminal() {
    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new("http://127.0.0.1:1"), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.submit("http://example.com/video");
    let view = wait_for(&mut rx, "stopped status", |v| v.status.is_stopped() && v.failure.is_some())
        .await;

    assert_eq!(view.failure, Some(FailureKind::ResolveFailed));
    assert!(view.thumbnail_url.is_empty());
    assert_eq!(player.play_count(), 0);

    session.shutdown();
    session.join().await;
}

// =============================================================================
// Happy Path: Scenarios A, B, C
// =============================================================================

/// Test: resolve success shows the thumbnail while waiting, a failed check
/// re-affirms waiting, and a successful check starts playback exactly once
#[tokio::test]
async fn test_submit_wait_play_flow() {
    let mut server = Server::new_async().await;

    let _post = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body(r#"{"success": true, "thumb_url": "http://x/thumb.jpg"}"#)
        .create_async()
        .await;
    let _not_ready = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(404)
        .create_async()
        .await;

    let player = RecordingPlayer::default();
    let client = UrlFeedClient::new(server.url());
    let stream_url = client.stream_url();
    let released = Arc::new(AtomicBool::new(false));
    let session = PlaybackSession::new(client, player.clone())
        .with_options(fast_options())
        .with_release_hook(RecordingHook(Arc::clone(&released)))
        .spawn();
    let mut rx = session.subscribe();

    session.submit("http://example.com/video");

    // Scenario A: waiting with the thumbnail style visible
    let view = wait_for(&mut rx, "thumbnail", |v| !v.thumbnail_url.is_empty()).await;
    assert!(view.status.is_waiting());
    assert_eq!(
        view.player_area_style().as_deref(),
        Some(r#"background-image: url("http://x/thumb.jpg")"#)
    );

    // Scenario B: first check misses, still waiting, attempt counted
    let view = wait_for(&mut rx, "first poll attempt", |v| v.attempt >= 1).await;
    assert!(view.status.is_waiting());

    // Scenario C: manifest appears; newest mock wins the route
    let _ready = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(200)
        .with_body("#EXTM3U\n")
        .create_async()
        .await;

    let view = wait_for(&mut rx, "playing status", |v| v.status.is_playing()).await;
    assert!(view.failure.is_none());

    // Exactly one play call, with the manifest as an HLS source
    assert_eq!(player.play_count(), 1);
    let calls = player.calls();
    assert!(calls.contains(&PlayerCall::SetSource(
        stream_url.clone(),
        "application/x-mpegURL".into()
    )));

    // Polling is over: attempts stay put, playback stays single
    let attempts_at_play = view.attempt;
    tokio::time::sleep(Duration::from_millis(80)).await;
    let view = session.view();
    assert!(view.status.is_playing());
    assert_eq!(view.attempt, attempts_at_play);
    assert_eq!(player.play_count(), 1);

    // Stopping after playback resets the player and fires the release seam
    session.stop();
    let view = wait_for(&mut rx, "stopped after stop", |v| v.status.is_stopped()).await;
    assert!(view.thumbnail_url.is_empty());
    assert!(released.load(Ordering::SeqCst));
    assert_eq!(*player.calls().last().unwrap(), PlayerCall::Reset);

    session.shutdown();
    session.join().await;
}

// =============================================================================
// Poll Budget
// =============================================================================

/// Test: readiness failing every time makes exactly 20 checks, then stops
#[tokio::test]
async fn test_poll_budget_exhaustion_makes_exactly_twenty_checks() {
    let mut server = Server::new_async().await;

    let _post = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(404)
        .expect(20)
        .create_async()
        .await;

    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new(server.url()), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.submit("http://example.com/video");
    let view = wait_for(&mut rx, "budget exhaustion", |v| {
        v.status.is_stopped() && v.failure.is_some()
    })
    .await;

    assert_eq!(view.failure, Some(FailureKind::StreamTimeout));
    assert!(view.thumbnail_url.is_empty());
    assert_eq!(player.play_count(), 0);

    // No dangling timer: nothing polls after the 20th check
    tokio::time::sleep(Duration::from_millis(100)).await;
    get.assert_async().await;

    session.shutdown();
    session.join().await;
}

/// Test: an explicit stop while waiting cancels the poll loop
#[tokio::test]
async fn test_stop_while_waiting_cancels_polling() {
    let mut server = Server::new_async().await;

    let _post = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body(r#"{"success": true, "thumb_url": "http://x/t.jpg"}"#)
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(404)
        .create_async()
        .await;

    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new(server.url()), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.submit("http://example.com/video");
    wait_for(&mut rx, "first poll attempt", |v| v.attempt >= 1).await;

    session.stop();
    let view = wait_for(&mut rx, "stopped status", |v| v.status.is_stopped()).await;
    assert!(view.thumbnail_url.is_empty());
    assert_eq!(player.play_count(), 0);

    // The attempt counter stays frozen once the loop is cancelled
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(session.view().attempt, 0);
    assert!(session.view().status.is_stopped());

    session.shutdown();
    session.join().await;
}

// =============================================================================
// Stop Idempotence
// =============================================================================

/// Test: stop when already stopped changes nothing and touches no player
#[tokio::test]
async fn test_stop_when_stopped_is_a_no_op() {
    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new("http://127.0.0.1:1"), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.stop();
    session.stop();

    // Each command round-trips through the task before the view republishes
    wait_for(&mut rx, "view publish", |_| true).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let view = session.view();
    assert!(view.status.is_stopped());
    assert!(view.thumbnail_url.is_empty());
    assert!(view.failure.is_none());
    assert!(player.calls().is_empty());

    session.shutdown();
    session.join().await;
}

/// Test: an explicit stop clears the failure left by the previous session
#[tokio::test]
async fn test_stop_dismisses_previous_failure() {
    let mut server = Server::new_async().await;

    let _post = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body(r#"{"success": false}"#)
        .create_async()
        .await;

    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new(server.url()), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.submit("not-a-video");
    wait_for(&mut rx, "resolve failure", |v| v.failure.is_some()).await;

    session.stop();
    let view = wait_for(&mut rx, "failure cleared", |v| v.failure.is_none()).await;
    assert!(view.status.is_stopped());

    session.shutdown();
    session.join().await;
}

// =============================================================================
// Resubmission
// =============================================================================

/// Test: submitting while playing tears playback down and starts a new wait
#[tokio::test]
async fn test_resubmit_while_playing_restarts_the_flow() {
    let mut server = Server::new_async().await;

    let _post = server
        .mock("POST", "/url-feed/seeurl")
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;
    let _ready = server
        .mock("GET", "/hls/stream.m3u8")
        .with_status(200)
        .with_body("#EXTM3U\n")
        .create_async()
        .await;

    let player = RecordingPlayer::default();
    let session = PlaybackSession::new(UrlFeedClient::new(server.url()), player.clone())
        .with_options(fast_options())
        .spawn();
    let mut rx = session.subscribe();

    session.submit("http://example.com/first");
    wait_for(&mut rx, "first playback", |v| v.status.is_playing()).await;
    assert_eq!(player.play_count(), 1);

    session.submit("http://example.com/second");
    wait_for(&mut rx, "second wait", |v| v.status.is_waiting()).await;
    wait_for(&mut rx, "second playback", |v| v.status.is_playing()).await;
    assert_eq!(player.play_count(), 2);

    session.shutdown();
    session.join().await;
}
