//! urlcast - terminal client for a url-feed HLS streaming backend
//!
//! Submit a video URL, wait for the backend to publish an HLS manifest,
//! and hand it to a local player. One session, one stream, one small state
//! machine.
//!
//! # Modules
//!
//! - `models` - Playback status, events, and the transition function
//! - `api` - url-feed backend client (resolve + readiness probe)
//! - `stream` - The player trait and its mpv/VLC implementation
//! - `session` - Background session driver with the readiness poll loop
//! - `app` - TUI input handling
//! - `ui` - TUI theme
//! - `cli` / `commands` - Headless scripting surface
//! - `config` - Config file handling

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod session;
pub mod stream;
pub mod ui;

// Re-export commonly used types
pub use api::{UrlFeedClient, UrlFeedError};
pub use app::{App, InputMode, UiAction};
pub use config::Config;
pub use models::{
    step, FailureKind, PlaybackStatus, SessionEvent, SideEffect, SubmitOutcome, Transition,
};
pub use session::{
    NoopRelease, PlaybackSession, ReleaseHook, SessionHandle, SessionOptions, SessionView,
};
pub use stream::{LocalPlayer, MediaPlayer, PlayerError, PlayerType};
