//! Configuration loading for FocusPulse
//!
//! Read from `~/.config/focuspulse/config.toml`. Every key is optional:
//!
//! ```toml
//! [store]
//! backend = "http"            # or "file"
//! url = "http://localhost:8080"
//! timeout_secs = 10
//!
//! [timer]
//! focus_minutes = 25
//! break_minutes = 5
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::paths::Paths;

/// FocusPulse configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub timer: TimerDefaults,
}

/// Where settings and session history are persisted
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend name: "http" or "file"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Base URL of the settings & session API
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend() -> String {
    "http".to_string()
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Known store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Http,
    File,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Http => "http",
            StoreBackend::File => "file",
        }
    }
}

impl StoreConfig {
    /// Resolve the configured backend name
    pub fn backend(&self) -> Result<StoreBackend> {
        match self.backend.to_lowercase().as_str() {
            "http" => Ok(StoreBackend::Http),
            "file" | "local" => Ok(StoreBackend::File),
            other => bail!("Unknown store backend: {} (expected \"http\" or \"file\")", other),
        }
    }
}

/// Durations used until the store answers (or when it never does)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimerDefaults {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,

    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

fn default_focus_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

impl Default for TimerDefaults {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Paths::new().config_file())
    }

    /// Load configuration from an explicit path, or use defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if config.timer.focus_minutes == 0 || config.timer.break_minutes == 0 {
            bail!(
                "Invalid timer defaults in {}: durations must be at least 1 minute",
                path.display()
            );
        }

        Ok(config)
    }
}
