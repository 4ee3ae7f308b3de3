//! Core domain types for playback sessions
//!
//! Holds the playback state machine as an explicit transition function
//! over (status, event), plus the constants shared by the backend client,
//! the session driver, and the CLI.

use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Path of the HLS manifest on the backend; also the playback source.
pub const STREAM_MANIFEST_PATH: &str = "/hls/stream.m3u8";

/// Path of the URL resolve endpoint on the backend.
pub const SEEURL_PATH: &str = "/url-feed/seeurl";

/// Media type handed to the player along with the manifest URL.
pub const HLS_MEDIA_TYPE: &str = "application/x-mpegURL";

/// Delay between readiness checks while waiting for the stream.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// How many readiness checks to make before giving up on the backend.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

// =============================================================================
// Playback Status
// =============================================================================

/// Playback status - the only state machine in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Idle; also the terminal state on any failure
    #[default]
    Stopped,
    /// Backend accepted the URL; stream not yet confirmed ready
    Waiting,
    /// Manifest confirmed available and handed to the player
    Playing,
}

impl PlaybackStatus {
    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackStatus::Stopped)
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, PlaybackStatus::Waiting)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }

    /// Upper-case label for status bars and logs
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "STOPPED",
            PlaybackStatus::Waiting => "WAITING",
            PlaybackStatus::Playing => "PLAYING",
        }
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// =============================================================================
// Events and Side Effects
// =============================================================================

/// Everything that can happen to a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User submitted a URL
    Submit,
    /// Backend accepted the URL, optionally reporting a preview thumbnail
    ResolveOk { thumb_url: Option<String> },
    /// Backend rejected the URL, or the resolve call itself failed
    ResolveFailed,
    /// Readiness check came back negative; routine while waiting
    PollNotReady { attempt: u32 },
    /// Readiness check succeeded - the manifest is there
    PollReady,
    /// All readiness attempts spent without the stream appearing
    PollBudgetExhausted,
    /// User asked to stop playback
    Stop,
}

/// Side effects the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Tear down the player (kills any running playback)
    ResetPlayer,
    /// Remember the preview thumbnail reported by the backend
    SetThumbnail(String),
    /// Forget any preview thumbnail
    ClearThumbnail,
    /// Start the readiness poll loop
    StartPolling,
    /// Cancel the readiness poll loop
    CancelPolling,
    /// Load the manifest into the player and start playback
    PlayStream,
}

/// Result of feeding one event into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: PlaybackStatus,
    pub effects: Vec<SideEffect>,
}

impl Transition {
    fn to(next: PlaybackStatus, effects: Vec<SideEffect>) -> Self {
        Self { next, effects }
    }

    /// Event does not apply in the current status; stay put, do nothing.
    fn ignore(current: PlaybackStatus) -> Self {
        Self {
            next: current,
            effects: Vec::new(),
        }
    }
}

// =============================================================================
// Transition Function
// =============================================================================

/// The playback state machine, centralized in one place.
///
/// Pure: takes the current status and an event, returns the next status and
/// the side effects the caller must perform. Events that do not apply in the
/// current status (e.g. a straggler poll response after a stop) are ignored.
pub fn step(status: PlaybackStatus, event: &SessionEvent) -> Transition {
    use PlaybackStatus::*;
    use SessionEvent::*;
    use SideEffect::*;

    match (status, event) {
        // Submit always tears down whatever is going on first.
        (Stopped, Submit) | (Playing, Submit) => {
            Transition::to(Waiting, vec![ResetPlayer, ClearThumbnail])
        }
        (Waiting, Submit) => {
            Transition::to(Waiting, vec![CancelPolling, ResetPlayer, ClearThumbnail])
        }

        // Resolve settles while waiting; anywhere else it is stale.
        (Waiting, ResolveOk { thumb_url }) => {
            let mut effects = Vec::new();
            if let Some(url) = thumb_url {
                effects.push(SetThumbnail(url.clone()));
            }
            effects.push(StartPolling);
            Transition::to(Waiting, effects)
        }
        (Waiting, ResolveFailed) => Transition::to(Stopped, vec![ClearThumbnail]),

        // Poll outcomes only mean something while waiting.
        (Waiting, PollNotReady { .. }) => Transition::to(Waiting, vec![]),
        (Waiting, PollReady) => Transition::to(Playing, vec![CancelPolling, PlayStream]),
        (Waiting, PollBudgetExhausted) => {
            Transition::to(Stopped, vec![CancelPolling, ClearThumbnail])
        }

        // Stop is idempotent: from Stopped it touches nothing.
        (Stopped, Stop) => Transition::ignore(Stopped),
        (Waiting, Stop) => {
            Transition::to(Stopped, vec![CancelPolling, ResetPlayer, ClearThumbnail])
        }
        (Playing, Stop) => Transition::to(Stopped, vec![ResetPlayer, ClearThumbnail]),

        _ => Transition::ignore(status),
    }
}

// =============================================================================
// Failure Kind
// =============================================================================

/// Why a session fell back to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Backend rejected the URL or the resolve call errored
    ResolveFailed,
    /// The stream never became ready within the poll budget
    StreamTimeout,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::ResolveFailed => "backend could not resolve the URL",
            FailureKind::StreamTimeout => "stream never became ready",
        }
    }
}

// =============================================================================
// Submit Outcome
// =============================================================================

/// What a successful resolve call reported back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitOutcome {
    /// Preview image for the resolved URL, when the backend has one
    pub thumb_url: Option<String>,
}
