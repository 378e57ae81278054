//! Key-value store abstraction.
//!
//! Sessions and rate counters live behind [`KvStore`] so the rest of the
//! crate never touches process-global state. Two backends:
//!
//! - [`MemoryStore`]: sharded map, single process, used by default and in tests
//! - [`PostgresStore`]: PostgreSQL table, shared between replicas

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use letterdesk_types::models::StoreConfig;

use crate::error::AppResult;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Value at '{key}' is not a counter")]
    NotACounter { key: String },
    #[error("Store query failed: {0}")]
    Query(String),
}

/// String-keyed store with per-key expiry.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Value stored at `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite `key`, resetting its expiry.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Atomically increment the counter at `key` and return the new value.
    ///
    /// A missing or expired counter starts at 1 with expiry `ttl`; an existing
    /// counter keeps its original expiry.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> StoreResult<u64>;

    /// Drop expired entries, returning how many were removed.
    async fn purge_expired(&self) -> StoreResult<u64>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Build the store selected by `config.url`.
pub async fn connect_store(config: &StoreConfig) -> AppResult<Arc<dyn KvStore>> {
    match config.url.as_deref() {
        Some(url) if config.is_postgres() => {
            let store = PostgresStore::connect(url).await?;
            store.ensure_schema().await?;
            tracing::info!("Using PostgreSQL key-value store");
            Ok(Arc::new(store))
        },
        Some(url) if !url.is_empty() && !url.starts_with("memory://") => Err(StoreError::Unavailable(
            format!("unsupported store url scheme: {}", scheme(url)),
        )
        .into()),
        _ => {
            tracing::info!("Using in-memory key-value store");
            Ok(Arc::new(MemoryStore::new()))
        },
    }
}

/// Periodically purge expired entries until the runtime shuts down.
pub fn spawn_purge_task(store: Arc<dyn KvStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {},
                Ok(n) => tracing::debug!("Purged {} expired {} store entries", n, store.backend()),
                Err(e) => tracing::warn!("Store purge failed: {}", e),
            }
        }
    })
}

fn scheme(url: &str) -> &str {
    url.split_once("://").map_or("<none>", |(s, _)| s)
}
