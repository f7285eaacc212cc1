use crate::{
    adapters::{http::app_state::AppState, json_file::JsonFileStore},
    infra::{
        InfraError,
        config::{AppConfig, StoreBackend},
        dynamodb_persistence, postgres_persistence,
        rate_limit::{NoopRateLimiter, RateLimiterTrait, RedisRateLimiter},
    },
    use_cases::waitlist::{WaitlistRepoTrait, WaitlistUseCases},
};
use secrecy::ExposeSecret;
use std::fs::File;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let repo = init_repo(&config).await?;

    let rate_limiter: Arc<dyn RateLimiterTrait> = match &config.redis_url {
        Some(redis_url) => Arc::new(
            RedisRateLimiter::new(
                redis_url,
                config.rate_limit_window_secs,
                config.rate_limit_per_ip,
            )
            .await?,
        ),
        None => {
            info!("REDIS_URL not set, submissions are not rate limited");
            Arc::new(NoopRateLimiter)
        }
    };

    let waitlist_use_cases = WaitlistUseCases::new(repo);

    Ok(AppState {
        config: Arc::new(config),
        waitlist_use_cases: Arc::new(waitlist_use_cases),
        rate_limiter,
    })
}

async fn init_repo(config: &AppConfig) -> Result<Arc<dyn WaitlistRepoTrait>, InfraError> {
    info!(store = %config.store, "Initializing waitlist store");

    let repo: Arc<dyn WaitlistRepoTrait> = match config.store {
        StoreBackend::File => {
            info!(path = %config.waitlist_file.display(), "Using local waitlist file");
            Arc::new(JsonFileStore::new(&config.waitlist_file))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .ok_or(InfraError::ConfigMissing { var: "DATABASE_URL" })?;
            Arc::new(postgres_persistence(database_url.expose_secret()).await?)
        }
        StoreBackend::DynamoDb => Arc::new(dynamodb_persistence(&config.waitlist_table).await),
    };

    Ok(repo)
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "waitlist=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), skipped when the working directory is read-only
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
