//! Media playback
//!
//! The session only ever needs three things from a player: reset it, give
//! it a source, tell it to play. `MediaPlayer` is exactly that surface;
//! `LocalPlayer` backs it with mpv or VLC.

pub mod player;

pub use player::{LocalPlayer, MediaPlayer, PlayerError, PlayerType};
