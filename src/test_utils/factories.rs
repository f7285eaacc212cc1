//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    application::use_cases::waitlist::NewSignup,
    domain::entities::waitlist_entry::{DEFAULT_SOURCE, WaitlistEntry},
};

/// Create a stored waitlist entry with sensible defaults.
pub fn create_test_entry(overrides: impl FnOnce(&mut WaitlistEntry)) -> WaitlistEntry {
    let mut entry = WaitlistEntry {
        id: Uuid::new_v4(),
        email: "user@example.com".to_string(),
        consent: true,
        consent_timestamp: test_datetime(),
        source: Some(DEFAULT_SOURCE.to_string()),
        ip_address: Some("127.0.0.1".to_string()),
        created_at: test_datetime(),
    };
    overrides(&mut entry);
    entry
}

/// A consenting signup for the given address with no optional fields.
pub fn test_signup(email: &str) -> NewSignup {
    NewSignup {
        email: email.to_string(),
        consent: true,
        source: None,
        consent_timestamp: None,
        ip_address: None,
    }
}

/// Fixed timestamp for deterministic fixtures.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}
