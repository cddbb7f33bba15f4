//! Settings & session store clients
//!
//! The timer only ever talks to a [`Store`]: read settings once at startup,
//! overwrite them on save, and append one record per completed phase. The
//! HTTP client speaks the `/api/settings` + `/api/sessions` contract; the file
//! store keeps the same semantics on local disk for offline use.

mod file;
mod http;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use focuspulse_core::{Paths, StoreBackend, StoreConfig};

use crate::error::StoreError;
use crate::session::{SessionRecord, StoredSession};
use crate::settings::Settings;

pub use file::FileStore;
pub use http::HttpStore;

/// Backend persistence for settings and session history
#[async_trait]
pub trait Store: Send + Sync {
    /// Current singleton settings
    async fn fetch_settings(&self) -> Result<Settings, StoreError>;

    /// Overwrite the singleton settings
    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;

    /// Append one immutable session record
    async fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Stored history, newest first
    async fn list_sessions(&self) -> Result<Vec<StoredSession>, StoreError>;
}

/// Build the store selected by configuration
pub fn build_store(config: &StoreConfig, paths: &Paths) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.backend()? {
        StoreBackend::Http => Arc::new(HttpStore::new(&config.url, config.timeout_secs)?),
        StoreBackend::File => Arc::new(FileStore::new(&paths.store_dir())?),
    };
    tracing::debug!(backend = config.backend.as_str(), "store ready");
    Ok(store)
}
