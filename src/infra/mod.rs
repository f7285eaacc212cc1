use aws_config::{BehaviorVersion, meta::region::RegionProviderChain};

use crate::adapters::{dynamodb::DynamoDbPersistence, persistence::PostgresPersistence};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod rate_limit;
pub mod setup;

pub use error::InfraError;

pub async fn postgres_persistence(database_url: &str) -> Result<PostgresPersistence, InfraError> {
    let pool = db::init_db(database_url).await?;
    Ok(PostgresPersistence::new(pool))
}

/// Region used when neither the environment nor the AWS profile names one.
const DEFAULT_AWS_REGION: &str = "eu-west-1";

pub async fn dynamodb_persistence(table: &str) -> DynamoDbPersistence {
    let region = RegionProviderChain::default_provider().or_else(DEFAULT_AWS_REGION);
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .load()
        .await;

    tracing::info!(table, region = ?sdk_config.region(), "Using DynamoDB waitlist table");
    DynamoDbPersistence::new(aws_sdk_dynamodb::Client::new(&sdk_config), table)
}
