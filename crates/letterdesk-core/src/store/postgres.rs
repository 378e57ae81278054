//! PostgreSQL implementation of the key-value store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::{KvStore, StoreError, StoreResult};

const SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS kv_entries (
    key        TEXT PRIMARY KEY,
    value      TEXT,
    counter    BIGINT NOT NULL DEFAULT 0,
    expires_at TIMESTAMPTZ NOT NULL
)"#;

const EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS kv_entries_expires_at_idx ON kv_entries (expires_at)";

/// PostgreSQL-backed store. Counter increments are a single upsert, so
/// concurrent requests from several replicas never lose an update.
pub struct PostgresStore {
    /// Database connection pool.
    pool: PgPool,
}

impl PostgresStore {
    /// Create store with existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to database and create store.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(300))
            .connect(database_url)
            .await
            .map_err(map_sqlx_err)?;
        Ok(Self::new(pool))
    }

    /// Create the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await.map_err(map_sqlx_err)?;
        sqlx::query(EXPIRY_INDEX).execute(&self.pool).await.map_err(map_sqlx_err)?;
        Ok(())
    }
}

fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}

fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        },
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl KvStore for PostgresStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let row: Option<Option<String>> = sqlx::query_scalar(
            "SELECT COALESCE(value, counter::TEXT) FROM kv_entries WHERE key = $1 AND expires_at > $2",
        )
        .bind(key)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.flatten())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let expires_at = expiry_from(Utc::now(), ttl);
        sqlx::query(
            r#"INSERT INTO kv_entries (key, value, counter, expires_at)
               VALUES ($1, $2, 0, $3)
               ON CONFLICT (key) DO UPDATE SET
                   value = EXCLUDED.value, counter = 0, expires_at = EXCLUDED.expires_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> StoreResult<u64> {
        let now = Utc::now();
        // A live text value makes the WHERE false, so no row comes back.
        let count: Option<i64> = sqlx::query_scalar(
            r#"INSERT INTO kv_entries (key, value, counter, expires_at)
               VALUES ($1, NULL, 1, $3)
               ON CONFLICT (key) DO UPDATE SET
                   value = NULL,
                   counter = CASE WHEN kv_entries.expires_at <= $2 THEN 1
                                  ELSE kv_entries.counter + 1 END,
                   expires_at = CASE WHEN kv_entries.expires_at <= $2 THEN EXCLUDED.expires_at
                                     ELSE kv_entries.expires_at END
               WHERE kv_entries.value IS NULL OR kv_entries.expires_at <= $2
               RETURNING counter"#,
        )
        .bind(key)
        .bind(now)
        .bind(expiry_from(now, ttl))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        match count {
            Some(count) => Ok(count.max(0) as u64),
            None => Err(StoreError::NotACounter { key: key.to_string() }),
        }
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
