//! HTTP client for the settings & session API
//!
//! - `GET  /api/settings`  → `{"focus_minutes": n, "break_minutes": n}`
//! - `POST /api/settings`  same body, overwrites the singleton
//! - `POST /api/sessions`  one session record, appended
//! - `GET  /api/sessions`  stored history, newest first

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

use super::Store;
use crate::error::StoreError;
use crate::session::{SessionRecord, StoredSession};
use crate::settings::Settings;

/// Store backed by the REST API
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("focuspulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-2xx answers become errors carrying the body for the log
    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn fetch_settings(&self) -> Result<Settings, StoreError> {
        let response = self.client.get(self.url("/api/settings")).send().await?;
        let body = Self::check(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.url("/api/settings"))
            .json(settings)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.url("/api/sessions"))
            .json(record)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<StoredSession>, StoreError> {
        let response = self.client.get(self.url("/api/sessions")).send().await?;
        let body = Self::check(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
