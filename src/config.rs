//! Configuration management for urlcast
//!
//! Config is stored at ~/.config/urlcast/config.toml. Every field has a
//! default matching the backend's contract, so a missing file just works.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use crate::session::SessionOptions;

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_max_poll_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the url-feed backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Delay between readiness checks, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Readiness checks to make before giving up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Preferred player (mpv or vlc)
    pub player: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            player: None,
        }
    }
}

impl Config {
    /// Get config file path (~/.config/urlcast/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("urlcast").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Backend base URL with fallback chain:
    /// 1. Environment variable URLCAST_BACKEND
    /// 2. Config file value
    pub fn backend_url(&self) -> String {
        if let Ok(url) = std::env::var("URLCAST_BACKEND") {
            return url;
        }
        self.backend_url.clone()
    }

    /// Poll tunables as session options
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts,
        }
    }
}
