//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates a minimal `AppState` backed by in-memory
//! mocks so routes can be driven through `axum_test::TestServer`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderValue;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::waitlist::{WaitlistRepoTrait, WaitlistUseCases},
    infra::{
        config::{AppConfig, StoreBackend},
        rate_limit::{NoopRateLimiter, RateLimiterTrait},
    },
    test_utils::InMemoryWaitlistRepo,
};

/// Counts submissions per IP with no expiry; rejects once `limit` is exceeded.
pub struct InMemoryRateLimiter {
    limit: u64,
    hits: Mutex<HashMap<String, u64>>,
}

impl InMemoryRateLimiter {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            hits: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(ip.to_string()).or_insert(0);
        *count += 1;
        if *count > self.limit {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let repo = Arc::new(InMemoryWaitlistRepo::new());
/// let app_state = TestAppStateBuilder::new()
///     .with_repo(repo.clone())
///     .with_trust_proxy(true)
///     .build();
/// ```
pub struct TestAppStateBuilder {
    repo: Option<Arc<dyn WaitlistRepoTrait>>,
    rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
    trust_proxy: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            repo: None,
            rate_limiter: None,
            trust_proxy: false,
        }
    }

    /// Use a specific repository (defaults to an empty `InMemoryWaitlistRepo`).
    pub fn with_repo(mut self, repo: Arc<dyn WaitlistRepoTrait>) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Use a specific rate limiter (defaults to `NoopRateLimiter`).
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn build(self) -> AppState {
        let repo = self
            .repo
            .unwrap_or_else(|| Arc::new(InMemoryWaitlistRepo::new()));
        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(NoopRateLimiter));

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:8001".parse().unwrap(),
            store: StoreBackend::File,
            waitlist_file: PathBuf::from("data/waitlist.json"),
            database_url: None,
            waitlist_table: "waitlist-test".to_string(),
            cors_origins: vec![HeaderValue::from_static("http://localhost:8080")],
            trust_proxy: self.trust_proxy,
            redis_url: None,
            rate_limit_window_secs: 60,
            rate_limit_per_ip: 10,
        });

        AppState {
            config,
            waitlist_use_cases: Arc::new(WaitlistUseCases::new(repo)),
            rate_limiter,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
