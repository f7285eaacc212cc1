use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr};

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;

/// Backing table implementation, chosen per deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON file on local disk, for development.
    File,
    Postgres,
    DynamoDb,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::File => "file",
            StoreBackend::Postgres => "postgres",
            StoreBackend::DynamoDb => "dynamodb",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "postgres" => Ok(StoreBackend::Postgres),
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            other => Err(format!("unknown waitlist store backend: {other}")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    /// Location of the JSON file used by the `file` backend.
    pub waitlist_file: PathBuf,
    pub database_url: Option<SecretString>,
    /// DynamoDB table holding one item per email.
    pub waitlist_table: String,
    pub cors_origins: Vec<HeaderValue>,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy or API gateway.
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    /// Rate limiting is disabled when unset.
    pub redis_url: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8001)));
        let store: StoreBackend = get_env_default("WAITLIST_STORE", StoreBackend::File);
        let waitlist_file = PathBuf::from(get_env_default(
            "WAITLIST_FILE",
            String::from("data/waitlist.json"),
        ));
        let database_url: Option<SecretString> = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::new(s.into()));
        let waitlist_table: String =
            get_env_default("WAITLIST_TABLE", "waitlist-prod".to_string());
        let cors_origins = parse_origins(&get_env_default(
            "CORS_ORIGINS",
            String::from("http://localhost:8080"),
        ));
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let redis_url: Option<String> = std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 10);

        Self {
            bind_addr,
            store,
            waitlist_file,
            database_url,
            waitlist_table,
            cors_origins,
            trust_proxy,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
        }
    }
}

/// Splits a comma separated origin list, skipping blanks and values that are
/// not valid header values. A wildcard is dropped since credentials are allowed.
pub fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter(|origin| {
            if *origin == "*" {
                tracing::warn!("Ignoring wildcard CORS origin");
                return false;
            }
            true
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
