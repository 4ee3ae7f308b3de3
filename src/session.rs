//! Playback session driver
//!
//! Owns the backend client, the player, and the state machine, and runs as
//! a background tokio task. Commands go in over an mpsc channel; the
//! observable session state comes back out over a watch channel, so the UI
//! (or a headless command) just renders the latest `SessionView`.
//!
//! The readiness poll is its own task holding a cancellation token. Every
//! exit from `Waiting` funnels through the state machine's `CancelPolling`
//! effect, so there is no path that leaves a live poll behind.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::UrlFeedClient;
use crate::models::{
    step, FailureKind, PlaybackStatus, SessionEvent, SideEffect, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL, HLS_MEDIA_TYPE,
};
use crate::stream::MediaPlayer;

// =============================================================================
// Options and Hooks
// =============================================================================

/// Tunables for the readiness poll loop.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Delay between readiness checks
    pub poll_interval: std::time::Duration,
    /// Readiness checks to make before giving up
    pub max_poll_attempts: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Seam for telling the backend to release a stream on stop.
///
/// The backend has no endpoint for this today, so the default does nothing
/// and the server keeps feeding the stream until it times out on its own.
pub trait ReleaseHook: Send {
    fn release(&self) {}
}

/// Default hook: no backend notification.
pub struct NoopRelease;

impl ReleaseHook for NoopRelease {}

// =============================================================================
// Observable View
// =============================================================================

/// Snapshot of the session as the UI should render it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub status: PlaybackStatus,
    /// Preview thumbnail URL; empty when absent
    pub thumbnail_url: String,
    /// Readiness checks made so far in the current wait
    pub attempt: u32,
    /// Why the last session fell back to Stopped, if it did
    pub failure: Option<FailureKind>,
}

impl SessionView {
    /// CSS-style background for the player area.
    ///
    /// Shows the thumbnail only while waiting with a known thumbnail,
    /// otherwise nothing.
    pub fn player_area_style(&self) -> Option<String> {
        if self.status.is_waiting() && !self.thumbnail_url.is_empty() {
            Some(format!("background-image: url(\"{}\")", self.thumbnail_url))
        } else {
            None
        }
    }
}

// =============================================================================
// Commands and Internal Inputs
// =============================================================================

/// Commands a session accepts from the outside.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Submit a URL for resolution and playback
    Submit(String),
    /// Stop playback and polling
    Stop,
    /// End the session task
    Shutdown,
}

/// Everything the session loop consumes: external commands plus events
/// reported back by the poll task.
#[derive(Debug)]
enum Input {
    Command(SessionCommand),
    Poll(SessionEvent),
}

// =============================================================================
// Handle
// =============================================================================

/// Handle to a running session task.
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Input>,
    view_rx: watch::Receiver<SessionView>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Submit a URL; no-op once the session has shut down
    pub fn submit(&self, url: impl Into<String>) {
        let _ = self.tx.send(Input::Command(SessionCommand::Submit(url.into())));
    }

    /// Stop playback
    pub fn stop(&self) {
        let _ = self.tx.send(Input::Command(SessionCommand::Stop));
    }

    /// Ask the session task to end
    pub fn shutdown(&self) {
        let _ = self.tx.send(Input::Command(SessionCommand::Shutdown));
    }

    /// Latest session snapshot
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Subscribe to session snapshots
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Wait for the session task to finish (after `shutdown`)
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

// =============================================================================
// Poll Task
// =============================================================================

/// Cancellation token plus task handle for one poll loop.
struct PollGuard {
    cancel: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollGuard {
    fn cancel(self) {
        self.cancel.notify_one();
        // The loop exits at its next suspension point; aborting as well
        // covers the case where it is parked in a long sleep.
        self.task.abort();
    }
}

/// Readiness poll loop.
///
/// Ticks are strictly sequential: the check is awaited before the next tick
/// is taken, so two checks are never in flight at once. The attempt counter
/// is checked before the request, so exhaustion on tick N+1 makes exactly N
/// checks in total.
async fn poll_loop(
    client: UrlFeedClient,
    opts: SessionOptions,
    cancel: Arc<Notify>,
    tx: mpsc::UnboundedSender<Input>,
) {
    let mut interval = tokio::time::interval(opts.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; consume it so
    // the first check happens one full interval after the resolve settled.
    interval.tick().await;

    let mut attempt: u32 = 0;
    loop {
        tokio::select! {
            _ = cancel.notified() => break,
            _ = interval.tick() => {
                attempt += 1;
                if attempt > opts.max_poll_attempts {
                    let _ = tx.send(Input::Poll(SessionEvent::PollBudgetExhausted));
                    break;
                }
                if client.stream_ready().await {
                    let _ = tx.send(Input::Poll(SessionEvent::PollReady));
                    break;
                }
                debug!(attempt, "stream not ready yet");
                let _ = tx.send(Input::Poll(SessionEvent::PollNotReady { attempt }));
            }
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// A playback session: one user, one stream, no persistence.
pub struct PlaybackSession<P> {
    client: UrlFeedClient,
    player: P,
    opts: SessionOptions,
    release: Box<dyn ReleaseHook>,
    view: SessionView,
    poll: Option<PollGuard>,
    /// Sender the poll task reports back on; set once the task runs
    loop_tx: Option<mpsc::UnboundedSender<Input>>,
}

impl<P: MediaPlayer + 'static> PlaybackSession<P> {
    pub fn new(client: UrlFeedClient, player: P) -> Self {
        Self {
            client,
            player,
            opts: SessionOptions::default(),
            release: Box::new(NoopRelease),
            view: SessionView::default(),
            poll: None,
            loop_tx: None,
        }
    }

    pub fn with_options(mut self, opts: SessionOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_release_hook(mut self, hook: impl ReleaseHook + 'static) -> Self {
        self.release = Box::new(hook);
        self
    }

    /// Spawn the session as a background task.
    pub fn spawn(self) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(self.view.clone());
        let loop_tx = tx.clone();
        let task = tokio::spawn(self.run(rx, loop_tx, view_tx));
        SessionHandle { tx, view_rx, task }
    }

    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Input>,
        loop_tx: mpsc::UnboundedSender<Input>,
        view_tx: watch::Sender<SessionView>,
    ) {
        self.loop_tx = Some(loop_tx);

        while let Some(input) = rx.recv().await {
            match input {
                Input::Command(SessionCommand::Submit(url)) => {
                    self.handle_submit(&url).await;
                }
                Input::Command(SessionCommand::Stop) => {
                    self.handle_stop();
                }
                Input::Command(SessionCommand::Shutdown) => break,
                Input::Poll(event) => {
                    self.handle_poll_event(event);
                }
            }
            view_tx.send_replace(self.view.clone());
        }

        // Session over: make sure nothing keeps running behind us.
        if let Some(guard) = self.poll.take() {
            guard.cancel();
        }
        self.player.reset();
    }

    /// Submit flow. The resolve call is fully settled before any polling
    /// starts; a stop queued behind it is handled right after.
    async fn handle_submit(&mut self, url: &str) {
        info!(url, "submitting URL");
        self.apply(&SessionEvent::Submit);
        self.view.attempt = 0;
        self.view.failure = None;

        match self.client.submit(url).await {
            Ok(outcome) => {
                info!(thumb = ?outcome.thumb_url, "backend accepted the URL");
                self.apply(&SessionEvent::ResolveOk {
                    thumb_url: outcome.thumb_url,
                });
            }
            Err(e) => {
                // Rejection and transport failure read the same: terminal
                // for this attempt, the user has to resubmit.
                error!(error = %e, "resolve failed");
                self.view.failure = Some(FailureKind::ResolveFailed);
                self.apply(&SessionEvent::ResolveFailed);
            }
        }
    }

    fn handle_stop(&mut self) {
        let was_active = !self.view.status.is_stopped();
        self.apply(&SessionEvent::Stop);
        self.view.attempt = 0;
        // A stop also dismisses whatever failed before it
        self.view.failure = None;
        if was_active {
            info!("playback stopped");
            // TODO: call the backend to release the stream once url-feed
            // grows an endpoint for it; see ReleaseHook.
            self.release.release();
        }
    }

    fn handle_poll_event(&mut self, event: SessionEvent) {
        if let SessionEvent::PollNotReady { attempt } = event {
            if self.view.status.is_waiting() {
                self.view.attempt = attempt;
            }
        }
        if matches!(event, SessionEvent::PollBudgetExhausted) && self.view.status.is_waiting() {
            warn!(
                attempts = self.opts.max_poll_attempts,
                "giving up on the stream, something went wrong on the backend?"
            );
            self.view.failure = Some(FailureKind::StreamTimeout);
        }
        self.apply(&event);
    }

    /// Feed one event through the machine and perform its side effects.
    fn apply(&mut self, event: &SessionEvent) {
        let transition = step(self.view.status, event);
        self.view.status = transition.next;

        for effect in transition.effects {
            match effect {
                SideEffect::ResetPlayer => self.player.reset(),
                SideEffect::SetThumbnail(url) => self.view.thumbnail_url = url,
                SideEffect::ClearThumbnail => self.view.thumbnail_url.clear(),
                SideEffect::StartPolling => self.start_polling(),
                SideEffect::CancelPolling => {
                    if let Some(guard) = self.poll.take() {
                        guard.cancel();
                    }
                }
                SideEffect::PlayStream => self.play_stream(),
            }
        }
    }

    fn start_polling(&mut self) {
        // A stale loop here would mean a CancelPolling effect was missed.
        if let Some(guard) = self.poll.take() {
            guard.cancel();
        }
        let Some(tx) = self.loop_tx.clone() else {
            // Not spawned yet; nothing to report into.
            return;
        };
        let cancel = Arc::new(Notify::new());
        let task = tokio::spawn(poll_loop(
            self.client.clone(),
            self.opts,
            Arc::clone(&cancel),
            tx,
        ));
        self.poll = Some(PollGuard { cancel, task });
    }

    fn play_stream(&mut self) {
        let url = self.client.stream_url();
        self.player.reset();
        self.player.set_source(&url, HLS_MEDIA_TYPE);
        match self.player.play() {
            Ok(()) => info!(url, "started playing"),
            Err(e) => error!(error = %e, "player failed to start"),
        }
    }

    /// Whether a poll loop is currently alive. Test seam.
    #[doc(hidden)]
    pub fn polling(&self) -> bool {
        self.poll.is_some()
    }
}
