//! DynamoDB storage backend.
//!
//! The table uses `email` (string) as its partition key. Every other field is
//! stored as a plain attribute; timestamps are RFC 3339 strings.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::DisplayErrorContext,
    types::{AttributeValue, ReturnValue, Select},
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::waitlist::WaitlistRepoTrait,
    domain::entities::waitlist_entry::WaitlistEntry,
};

const KEY_ATTR: &str = "email";

type Item = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct DynamoDbPersistence {
    client: Client,
    table: String,
}

impl DynamoDbPersistence {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn key(email: &str) -> AttributeValue {
        AttributeValue::S(email.to_string())
    }
}

#[async_trait]
impl WaitlistRepoTrait for DynamoDbPersistence {
    async fn get(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTR, Self::key(email))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| store_error("GetItem", e))?;

        output.item().map(item_to_entry).transpose()
    }

    async fn insert_if_absent(&self, entry: &WaitlistEntry) -> AppResult<bool> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(entry_to_item(entry)))
            .condition_expression("attribute_not_exists(#email)")
            .expression_attribute_names("#email", KEY_ATTR)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Ok(false)
            }
            Err(err) => Err(store_error("PutItem", err)),
        }
    }

    async fn delete(&self, email: &str) -> AppResult<bool> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key(KEY_ATTR, Self::key(email))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| store_error("DeleteItem", e))?;

        Ok(output.attributes().is_some_and(|old| !old.is_empty()))
    }

    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>> {
        let mut entries = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .consistent_read(true)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| store_error("Scan", e))?;

            for item in output.items() {
                entries.push(item_to_entry(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(entries)
    }

    async fn count(&self) -> AppResult<u64> {
        let mut total: u64 = 0;
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .select(Select::Count)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| store_error("Scan", e))?;

            total += output.count().max(0) as u64;

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(total)
    }
}

fn store_error(operation: &'static str, err: impl std::error::Error) -> AppError {
    tracing::error!(
        operation,
        error = %DisplayErrorContext(&err),
        "DynamoDB request failed"
    );
    AppError::StoreUnavailable(format!("DynamoDB {operation} failed"))
}

// ============================================================================
// Item Conversions
// ============================================================================

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn entry_to_item(entry: &WaitlistEntry) -> Item {
    let mut item = HashMap::from([
        (KEY_ATTR.to_string(), AttributeValue::S(entry.email.clone())),
        ("id".to_string(), AttributeValue::S(entry.id.to_string())),
        ("consent".to_string(), AttributeValue::Bool(entry.consent)),
        (
            "consent_timestamp".to_string(),
            AttributeValue::S(format_timestamp(&entry.consent_timestamp)),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(format_timestamp(&entry.created_at)),
        ),
    ]);

    if let Some(source) = &entry.source {
        item.insert("source".to_string(), AttributeValue::S(source.clone()));
    }
    if let Some(ip) = &entry.ip_address {
        item.insert("ip_address".to_string(), AttributeValue::S(ip.clone()));
    }

    item
}

pub(crate) fn item_to_entry(item: &Item) -> AppResult<WaitlistEntry> {
    let email = required_string(item, "<unknown>", KEY_ATTR)?;
    let id = Uuid::parse_str(required_string(item, email, "id")?)
        .map_err(|_| malformed(email, "id"))?;
    let consent = item
        .get("consent")
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| malformed(email, "consent"))?;
    let consent_timestamp = parse_timestamp(item, email, "consent_timestamp")?;
    let created_at = parse_timestamp(item, email, "created_at")?;

    Ok(WaitlistEntry {
        id,
        email: email.to_string(),
        consent,
        consent_timestamp,
        source: optional_string(item, "source"),
        ip_address: optional_string(item, "ip_address"),
        created_at,
    })
}

fn required_string<'a>(item: &'a Item, email: &str, name: &'static str) -> AppResult<&'a str> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| malformed(email, name))
}

fn optional_string(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn parse_timestamp(item: &Item, email: &str, name: &'static str) -> AppResult<DateTime<Utc>> {
    let raw = required_string(item, email, name)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| malformed(email, name))
}

fn malformed(email: &str, field: &'static str) -> AppError {
    tracing::error!(email, field, "Malformed waitlist item in DynamoDB");
    AppError::StoreUnavailable(format!("Malformed waitlist record: {field}"))
}
