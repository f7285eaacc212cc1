//! In-memory mock implementations of the waitlist repository trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::waitlist::WaitlistRepoTrait,
    domain::entities::waitlist_entry::WaitlistEntry,
};

/// In-memory implementation of WaitlistRepoTrait for testing.
#[derive(Default)]
pub struct InMemoryWaitlistRepo {
    pub entries: Mutex<HashMap<String, WaitlistEntry>>,
}

impl InMemoryWaitlistRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial entries for testing.
    pub fn with_entries(entries: Vec<WaitlistEntry>) -> Self {
        let map: HashMap<String, WaitlistEntry> =
            entries.into_iter().map(|e| (e.email.clone(), e)).collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Get all entries (for test assertions).
    pub fn get_all(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl WaitlistRepoTrait for InMemoryWaitlistRepo {
    async fn get(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        Ok(self.entries.lock().unwrap().get(email).cloned())
    }

    async fn insert_if_absent(&self, entry: &WaitlistEntry) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&entry.email) {
            return Ok(false);
        }
        entries.insert(entry.email.clone(), entry.clone());
        Ok(true)
    }

    async fn delete(&self, email: &str) -> AppResult<bool> {
        Ok(self.entries.lock().unwrap().remove(email).is_some())
    }

    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>> {
        Ok(self.get_all())
    }
}

/// Repo whose every call fails as if the table were unreachable.
pub struct FailingWaitlistRepo;

#[async_trait]
impl WaitlistRepoTrait for FailingWaitlistRepo {
    async fn get(&self, _email: &str) -> AppResult<Option<WaitlistEntry>> {
        Err(unavailable())
    }

    async fn insert_if_absent(&self, _entry: &WaitlistEntry) -> AppResult<bool> {
        Err(unavailable())
    }

    async fn delete(&self, _email: &str) -> AppResult<bool> {
        Err(unavailable())
    }

    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>> {
        Err(unavailable())
    }
}

fn unavailable() -> AppError {
    AppError::StoreUnavailable("table unreachable".into())
}

/// Simulates losing a conditional-write race: the first lookup misses, the
/// write is rejected, and later lookups see the winner's entry.
pub struct RacingWaitlistRepo {
    winner: WaitlistEntry,
    lookups: Mutex<u32>,
}

impl RacingWaitlistRepo {
    pub fn new(winner: WaitlistEntry) -> Self {
        Self {
            winner,
            lookups: Mutex::new(0),
        }
    }
}

#[async_trait]
impl WaitlistRepoTrait for RacingWaitlistRepo {
    async fn get(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let mut lookups = self.lookups.lock().unwrap();
        *lookups += 1;
        if *lookups == 1 || email != self.winner.email {
            return Ok(None);
        }
        Ok(Some(self.winner.clone()))
    }

    async fn insert_if_absent(&self, _entry: &WaitlistEntry) -> AppResult<bool> {
        Ok(false)
    }

    async fn delete(&self, _email: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>> {
        Ok(vec![self.winner.clone()])
    }
}
