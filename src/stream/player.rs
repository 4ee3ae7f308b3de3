//! Local player - VLC/mpv playback support
//!
//! Plays the HLS manifest in VLC or mpv. The session owns one player for
//! its whole lifetime and reuses it across submits, so `reset` must kill
//! whatever the previous session left running.

use std::process::Stdio;
use std::str::FromStr;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::models::HLS_MEDIA_TYPE;

/// The narrow player surface the session depends on.
///
/// `set_source` only records the pending source; `play` is what actually
/// starts playback on it.
pub trait MediaPlayer: Send {
    /// Tear down any current playback and forget the pending source
    fn reset(&mut self);

    /// Record the source to play next
    fn set_source(&mut self, url: &str, media_type: &str);

    /// Start playback of the recorded source
    fn play(&mut self) -> Result<(), PlayerError>;
}

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// mpv media player (default)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Mpv => "mpv",
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Mpv => "mpv",
            PlayerType::Vlc => "VLC",
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PlayerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mpv" => Ok(PlayerType::Mpv),
            "vlc" => Ok(PlayerType::Vlc),
            other => Err(format!("unknown player '{}', expected mpv or vlc", other)),
        }
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("No source set")]
    NoSource,
}

/// Pending playback source
#[derive(Debug, Clone)]
struct Source {
    url: String,
    media_type: String,
}

/// Local player for the HLS stream
pub struct LocalPlayer {
    player_type: PlayerType,
    source: Option<Source>,
    child: Option<Child>,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        Self {
            player_type,
            source: None,
            child: None,
        }
    }

    /// Create an mpv player
    pub fn mpv() -> Self {
        Self::new(PlayerType::Mpv)
    }

    /// Create a VLC player
    pub fn vlc() -> Self {
        Self::new(PlayerType::Vlc)
    }

    /// Get the player type
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        // Otherwise use 'which' to find in PATH
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn build_command(&self, source: &Source) -> Command {
        let mut cmd = Command::new(self.player_type.command());

        match self.player_type {
            PlayerType::Mpv => {
                cmd.arg(&source.url);
                cmd.arg("--force-window=immediate"); // Show window immediately
                if source.media_type == HLS_MEDIA_TYPE {
                    // Skip format probing, the backend told us it's HLS
                    cmd.arg("--demuxer-lavf-format=hls");
                }
            }
            PlayerType::Vlc => {
                cmd.arg(&source.url);
                cmd.arg("--no-video-title-show"); // Don't show filename overlay
            }
        }

        // Don't capture output - the stream player has its own window
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        cmd
    }
}

impl MediaPlayer for LocalPlayer {
    fn reset(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(player = %self.player_type, "killing previous player process");
            if let Err(e) = child.start_kill() {
                // Already exited on its own, most likely
                debug!(error = %e, "player process was not running");
            }
        }
        self.source = None;
    }

    fn set_source(&mut self, url: &str, media_type: &str) {
        self.source = Some(Source {
            url: url.to_string(),
            media_type: media_type.to_string(),
        });
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let source = self.source.as_ref().ok_or(PlayerError::NoSource)?;

        let mut cmd = self.build_command(source);
        match cmd.spawn() {
            Ok(child) => {
                self.child = Some(child);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(player = %self.player_type, "player binary not found");
                Err(PlayerError::NotFound(
                    self.player_type.command().to_string(),
                ))
            }
            Err(e) => Err(PlayerError::StartFailed(e)),
        }
    }
}

impl Drop for LocalPlayer {
    fn drop(&mut self) {
        self.reset();
    }
}
