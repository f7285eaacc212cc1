use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Origin tag recorded when a signup does not say where it came from.
pub const DEFAULT_SOURCE: &str = "landing_page";

/// A single registered email address.
///
/// `email` is the normalized primary key. `id` and `ip_address` are internal
/// bookkeeping and never leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub consent: bool,
    pub consent_timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Added,
    AlreadyRegistered,
}
