//! CLI - command line interface for urlcast
//!
//! Run without a subcommand to launch the interactive TUI. Subcommands run
//! headless for scripting: `play` drives a full submit-poll-play flow,
//! `check` probes manifest readiness once.
//!
//! # Examples
//!
//! ```bash
//! # Launch interactive TUI
//! urlcast
//!
//! # Headless: submit a URL, wait for the stream, open the player
//! urlcast play "https://youtube.com/watch?v=abc" --backend http://tv-pi:8080
//!
//! # Is the manifest there right now?
//! urlcast check && echo ready
//! ```

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Backend rejected the URL or the resolve call failed
    ResolveFailed = 2,
    /// Stream never became ready within the poll budget
    StreamTimeout = 3,
    /// Stream is ready but the player could not be started
    PlayerFailed = 4,
    /// Manifest not ready (from `check`)
    NotReady = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// urlcast - terminal client for a url-feed HLS streaming backend
///
/// Run without arguments to launch the interactive TUI.
/// Use subcommands for automation and scripting.
#[derive(Parser, Debug)]
#[command(
    name = "urlcast",
    version,
    author = "Gorka & Hermes",
    about = "Submit a video URL to a url-feed backend and play its HLS stream",
    after_help = "EXAMPLES:\n\
                  urlcast                              Launch interactive TUI\n\
                  urlcast play \"https://yt.be/abc\"     Submit, wait, play\n\
                  urlcast check                        Probe stream readiness"
)]
pub struct Cli {
    /// Backend base URL (overrides config and URLCAST_BACKEND)
    #[arg(long, short = 'b', global = true)]
    pub backend: Option<String>,

    /// Player to use: mpv or vlc
    #[arg(long, short = 'p', global = true)]
    pub player: Option<String>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a URL, wait for the stream, and open the player
    #[command(visible_alias = "p")]
    Play(PlayCmd),

    /// Probe the HLS manifest for readiness once
    #[command(visible_alias = "c")]
    Check(CheckCmd),
}

/// Arguments for the play command
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Video URL to submit to the backend
    pub url: String,

    /// Delay between readiness checks, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Readiness checks to make before giving up
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Resolve and wait, but don't launch a player
    #[arg(long)]
    pub no_player: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckCmd {}
