//! Error types for the timer and its store

use thiserror::Error;

/// Failures talking to a settings & session store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors surfaced by the timer
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Failed to fetch settings: {0}")]
    SettingsFetchFailed(#[source] StoreError),

    #[error("Failed to save settings: {0}")]
    SettingsSaveFailed(#[source] StoreError),

    #[error("Failed to save session: {0}")]
    SessionSaveFailed(#[source] StoreError),

    #[error("Failed to load session history: {0}")]
    HistoryFetchFailed(#[source] StoreError),

    #[error("Invalid {field} duration: {input:?} (enter a whole number of minutes, at least 1)")]
    InvalidDurationInput { field: &'static str, input: String },
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;
