use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::waitlist::WaitlistRepoTrait,
    domain::entities::waitlist_entry::WaitlistEntry,
};

const SELECT_COLUMNS: &str =
    "id, email, consent, consent_timestamp, source, ip_address, created_at";

fn row_to_entry(row: sqlx::postgres::PgRow) -> WaitlistEntry {
    WaitlistEntry {
        id: row.get("id"),
        email: row.get("email"),
        consent: row.get("consent"),
        consent_timestamp: row.get("consent_timestamp"),
        source: row.get("source"),
        ip_address: row.get("ip_address"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl WaitlistRepoTrait for PostgresPersistence {
    async fn get(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM waitlist_entries WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_entry))
    }

    async fn insert_if_absent(&self, entry: &WaitlistEntry) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO waitlist_entries (id, email, consent, consent_timestamp, source, ip_address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(entry.id)
        .bind(&entry.email)
        .bind(entry.consent)
        .bind(entry.consent_timestamp)
        .bind(&entry.source)
        .bind(&entry.ip_address)
        .bind(entry.created_at)
        .execute(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, email: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM waitlist_entries WHERE email = $1")
            .bind(email)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn scan(&self) -> AppResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM waitlist_entries ORDER BY created_at ASC, email ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM waitlist_entries")
            .fetch_one(self.pool())
            .await
            .map_err(AppError::from)?;

        let count: i64 = row.get("count");
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{infra::db::init_db, test_utils::create_test_entry};

    #[tokio::test]
    #[ignore] // Needs Postgres at DATABASE_URL, run with: cargo test postgres_ -- --ignored
    async fn postgres_conditional_write_and_delete() {
        let database_url = std::env::var("DATABASE_URL").unwrap();
        let store = PostgresPersistence::new(init_db(&database_url).await.unwrap());

        let email = format!("{}@example.com", Uuid::new_v4());
        let entry = create_test_entry(|e| e.email = email.clone());

        assert!(store.insert_if_absent(&entry).await.unwrap());
        let rival = create_test_entry(|e| e.email = email.clone());
        assert!(!store.insert_if_absent(&rival).await.unwrap());

        assert_eq!(store.get(&email).await.unwrap(), Some(entry));

        assert!(store.delete(&email).await.unwrap());
        assert!(!store.delete(&email).await.unwrap());
        assert_eq!(store.get(&email).await.unwrap(), None);
    }
}
