//! Headless command implementations
//!
//! The CLI subcommands reuse the exact session driver the TUI runs, just
//! without a terminal UI: spawn the session, submit, and watch the view
//! until the status settles.

use std::time::Duration;

use crate::api::UrlFeedClient;
use crate::cli::{CheckCmd, ExitCode, PlayCmd};
use crate::models::FailureKind;
use crate::session::{PlaybackSession, SessionOptions};
use crate::stream::{LocalPlayer, MediaPlayer, PlayerError, PlayerType};

/// Player that swallows every call; used with `--no-player`.
struct NullPlayer;

impl MediaPlayer for NullPlayer {
    fn reset(&mut self) {}
    fn set_source(&mut self, _url: &str, _media_type: &str) {}
    fn play(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }
}

/// Submit a URL, wait for the stream, and open the player.
pub async fn play_cmd(
    cmd: PlayCmd,
    backend: String,
    player_type: PlayerType,
    mut opts: SessionOptions,
) -> ExitCode {
    if let Some(ms) = cmd.interval_ms {
        opts.poll_interval = Duration::from_millis(ms);
    }
    if let Some(n) = cmd.max_polls {
        opts.max_poll_attempts = n;
    }

    let client = UrlFeedClient::new(backend);

    if cmd.no_player {
        run_to_playing(client, NullPlayer, opts, &cmd.url).await
    } else {
        let player = LocalPlayer::new(player_type);
        if !player.is_available().await {
            eprintln!(
                "Error: player '{}' not found. Install it or pass --no-player.",
                player_type
            );
            return ExitCode::PlayerFailed;
        }
        run_to_playing(client, player, opts, &cmd.url).await
    }
}

/// Drive a session until it reaches Playing or falls back to Stopped.
async fn run_to_playing<P: MediaPlayer + 'static>(
    client: UrlFeedClient,
    player: P,
    opts: SessionOptions,
    url: &str,
) -> ExitCode {
    let stream_url = client.stream_url();
    let session = PlaybackSession::new(client, player)
        .with_options(opts)
        .spawn();
    let mut rx = session.subscribe();

    session.submit(url);
    eprintln!("Submitted {}", url);

    loop {
        if rx.changed().await.is_err() {
            // Session task died underneath us
            return ExitCode::Error;
        }
        let view = rx.borrow_and_update().clone();

        if view.status.is_playing() {
            println!("{}", stream_url);
            // Leave the session (and the spawned player) running; the
            // process exiting does not take the player window with it.
            return ExitCode::Success;
        }
        if view.status.is_stopped() {
            return match view.failure {
                Some(FailureKind::ResolveFailed) => {
                    eprintln!("Error: {}", FailureKind::ResolveFailed.message());
                    ExitCode::ResolveFailed
                }
                Some(FailureKind::StreamTimeout) => {
                    eprintln!("Error: {}", FailureKind::StreamTimeout.message());
                    ExitCode::StreamTimeout
                }
                None => ExitCode::Error,
            };
        }
        // Still waiting; keep watching
    }
}

/// Probe the HLS manifest for readiness once.
pub async fn check_cmd(_cmd: CheckCmd, backend: String) -> ExitCode {
    let client = UrlFeedClient::new(backend);
    if client.stream_ready().await {
        println!("ready {}", client.stream_url());
        ExitCode::Success
    } else {
        println!("not ready");
        ExitCode::NotReady
    }
}
