use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::validators::{MAX_SOURCE_LEN, is_valid_email, normalize_email};
use crate::domain::entities::waitlist_entry::{DEFAULT_SOURCE, RegistrationStatus, WaitlistEntry};

// ============================================================================
// Repository Trait
// ============================================================================

/// Key-value access to the waitlist table, keyed by normalized email.
#[async_trait]
pub trait WaitlistRepoTrait: Send + Sync {
    async fn get(&self, email: &str) -> AppResult<Option<WaitlistEntry>>;

    /// Writes the entry only if no record exists for its email.
    /// Returns `false` when the key was already taken.
    async fn insert_if_absent(&self, entry: &WaitlistEntry) -> AppResult<bool>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, email: &str) -> AppResult<bool>;

    /// Every entry in the table, in no particular order.
    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>>;

    async fn count(&self) -> AppResult<u64> {
        Ok(self.scan().await?.len() as u64)
    }
}

// ============================================================================
// Profile Types
// ============================================================================

/// The publicly visible fields of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitlistEntryProfile {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub source: Option<String>,
}

impl From<&WaitlistEntry> for WaitlistEntryProfile {
    fn from(entry: &WaitlistEntry) -> Self {
        Self {
            email: entry.email.clone(),
            created_at: entry.created_at,
            source: entry.source.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: String,
    pub consent: bool,
    pub source: Option<String>,
    pub consent_timestamp: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub entry: WaitlistEntryProfile,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitlistStats {
    pub total_subscribers: u64,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct WaitlistUseCases {
    repo: Arc<dyn WaitlistRepoTrait>,
}

impl WaitlistUseCases {
    pub fn new(repo: Arc<dyn WaitlistRepoTrait>) -> Self {
        Self { repo }
    }

    /// Register an email. Submitting an address that is already on the list
    /// succeeds with `AlreadyRegistered` and leaves the stored entry untouched.
    #[instrument(skip(self, signup), fields(source = ?signup.source))]
    pub async fn submit(&self, signup: NewSignup) -> AppResult<SubmitOutcome> {
        let email = normalize_email(&signup.email);
        if !is_valid_email(&email) {
            return Err(AppError::validation("email", "Invalid email address"));
        }

        if !signup.consent {
            return Err(AppError::validation(
                "consent",
                "Consent must be given to join the waitlist",
            ));
        }

        let source = normalize_source(signup.source.as_deref())?;

        if let Some(existing) = self.repo.get(&email).await? {
            info!(email = %email, "Email already on the waitlist");
            return Ok(already_registered(&existing));
        }

        // Stores keep microseconds; truncate so the response matches later reads.
        let now = Utc::now().trunc_subsecs(6);
        let entry = WaitlistEntry {
            id: Uuid::new_v4(),
            email,
            consent: true,
            consent_timestamp: signup
                .consent_timestamp
                .map_or(now, |ts| ts.trunc_subsecs(6)),
            source: Some(source),
            ip_address: signup.ip_address,
            created_at: now,
        };

        if self.repo.insert_if_absent(&entry).await? {
            info!(email = %entry.email, "New waitlist signup");
            return Ok(SubmitOutcome {
                entry: WaitlistEntryProfile::from(&entry),
                status: RegistrationStatus::Added,
            });
        }

        // A concurrent submission won the conditional write.
        let existing = self.repo.get(&entry.email).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "conflicting write for {} left no record",
                entry.email
            ))
        })?;

        Ok(already_registered(&existing))
    }

    /// All entries, oldest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<WaitlistEntryProfile>> {
        let mut entries = self.repo.scan().await?;
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });

        Ok(entries.iter().map(WaitlistEntryProfile::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, email: &str) -> AppResult<WaitlistEntryProfile> {
        let email = parse_email(email)?;

        self.repo
            .get(&email)
            .await?
            .map(|entry| WaitlistEntryProfile::from(&entry))
            .ok_or(AppError::NotFound)
    }

    /// Permanently erase an entry. Returns the normalized email that was removed.
    #[instrument(skip(self))]
    pub async fn remove(&self, email: &str) -> AppResult<String> {
        let email = parse_email(email)?;

        if !self.repo.delete(&email).await? {
            return Err(AppError::NotFound);
        }

        info!(email = %email, "Removed from waitlist");
        Ok(email)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<WaitlistStats> {
        Ok(WaitlistStats {
            total_subscribers: self.repo.count().await?,
        })
    }
}

// ============================================================================
// Private Helpers
// ============================================================================

fn parse_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(AppError::validation("email", "Invalid email address"));
    }
    Ok(email)
}

fn normalize_source(source: Option<&str>) -> AppResult<String> {
    let source = source.map(str::trim).unwrap_or_default();
    if source.is_empty() {
        return Ok(DEFAULT_SOURCE.to_string());
    }

    if source.chars().count() > MAX_SOURCE_LEN {
        return Err(AppError::validation(
            "source",
            format!("Source must be at most {MAX_SOURCE_LEN} characters"),
        ));
    }

    Ok(source.to_string())
}

fn already_registered(entry: &WaitlistEntry) -> SubmitOutcome {
    SubmitOutcome {
        entry: WaitlistEntryProfile::from(entry),
        status: RegistrationStatus::AlreadyRegistered,
    }
}
