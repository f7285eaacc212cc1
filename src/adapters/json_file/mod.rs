//! JSON file storage backend for local development.
//!
//! The whole waitlist lives in one pretty-printed JSON array. Each operation
//! loads the file, applies its change and atomically replaces the file, all
//! while holding a process-local lock.

use std::{io, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::waitlist::WaitlistRepoTrait,
    domain::entities::waitlist_entry::WaitlistEntry,
};

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// A missing or blank file is an empty waitlist.
    async fn load(&self) -> AppResult<Vec<WaitlistEntry>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error("read", err)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            tracing::error!(path = %self.path.display(), error = %err, "Waitlist file is corrupt");
            AppError::StoreUnavailable("Waitlist file is corrupt".into())
        })
    }

    async fn save(&self, entries: &[WaitlistEntry]) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.io_error("create directory", err))?;
        }

        let body = serde_json::to_vec_pretty(entries)
            .map_err(|err| AppError::Internal(format!("serialize waitlist: {err}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|err| self.io_error("write", err))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| self.io_error("replace", err))
    }

    fn io_error(&self, action: &'static str, err: io::Error) -> AppError {
        tracing::error!(path = %self.path.display(), action, error = %err, "Waitlist file I/O failed");
        AppError::StoreUnavailable(format!("Failed to {action} waitlist file"))
    }
}

#[async_trait]
impl WaitlistRepoTrait for JsonFileStore {
    async fn get(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|e| e.email == email))
    }

    async fn insert_if_absent(&self, entry: &WaitlistEntry) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.iter().any(|e| e.email == entry.email) {
            return Ok(false);
        }

        entries.push(entry.clone());
        self.save(&entries).await?;
        Ok(true)
    }

    async fn delete(&self, email: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| e.email != email);
        if entries.len() == before {
            return Ok(false);
        }

        self.save(&entries).await?;
        Ok(true)
    }

    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }
}
