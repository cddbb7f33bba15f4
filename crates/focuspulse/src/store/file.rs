//! Offline file-backed store
//!
//! Same semantics as the HTTP backend, on local disk:
//! - Settings: <dir>/settings.json (defaults until first save)
//! - Session logs: <dir>/sessions-YYYY-MM-DD.jsonl, one record per line, append-only

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::Store;
use crate::error::StoreError;
use crate::session::{SessionRecord, StoredSession};
use crate::settings::Settings;

/// Settings & session store on the local filesystem
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory
    pub fn new(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir)?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    fn session_log_path(&self, date: &NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("sessions-{}.jsonl", date.format("%Y-%m-%d")))
    }

    fn read_settings(&self) -> Result<Settings, StoreError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(self.settings_path(), content)?;
        Ok(())
    }

    fn append_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let path = self.session_log_path(&record.session_date);
        let line = serde_json::to_string(record)?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Session log files sorted oldest day first
    fn session_logs(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("sessions-") && n.ends_with(".jsonl"))
                    .unwrap_or(false)
            })
            .collect();
        logs.sort();
        Ok(logs)
    }

    fn read_sessions(&self) -> Result<Vec<StoredSession>, StoreError> {
        let mut sessions = Vec::new();

        for path in self.session_logs()? {
            let reader = BufReader::new(fs::File::open(&path)?);

            for (line_num, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<SessionRecord>(&line) {
                    Ok(record) => sessions.push(StoredSession::from(&record)),
                    Err(e) => {
                        // One bad line shouldn't hide the rest of the history
                        tracing::warn!(
                            file = %path.display(),
                            line = line_num + 1,
                            error = %e,
                            "skipping unparseable session"
                        );
                    }
                }
            }
        }

        // Append order within a day, days in order; number them and flip to newest first
        for (i, session) in sessions.iter_mut().enumerate() {
            session.id = Some(i as i64 + 1);
        }
        sessions.reverse();
        Ok(sessions)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn fetch_settings(&self) -> Result<Settings, StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.read_settings()).await?
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let store = self.clone();
        let settings = *settings;
        tokio::task::spawn_blocking(move || store.write_settings(&settings)).await?
    }

    async fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let store = self.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || store.append_session(&record)).await?
    }

    async fn list_sessions(&self) -> Result<Vec<StoredSession>, StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.read_sessions()).await?
    }
}
