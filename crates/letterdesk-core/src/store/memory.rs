use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::{KvStore, StoreError, StoreResult};

const CLEANUP_THRESHOLD: usize = 10_000;

enum Value {
    Text(String),
    Counter(u64),
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process store. Increments are atomic through the per-shard entry lock.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cleanup_if_needed(&self) {
        if self.entries.len() > CLEANUP_THRESHOLD {
            let now = Instant::now();
            self.entries.retain(|_, e| !e.is_expired(now));
        }
    }
}

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now)
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.is_expired(now) {
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(now));
            return Ok(None);
        }
        Ok(Some(match &entry.value {
            Value::Text(s) => s.clone(),
            Value::Counter(n) => n.to_string(),
        }))
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.cleanup_if_needed();
        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            Entry { value: Value::Text(value.to_string()), expires_at: deadline(now, ttl) },
        );
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> StoreResult<u64> {
        self.cleanup_if_needed();
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry { value: Value::Counter(0), expires_at: deadline(now, ttl) });

        if entry.is_expired(now) {
            *entry = Entry { value: Value::Counter(0), expires_at: deadline(now, ttl) };
        }

        match &mut entry.value {
            Value::Counter(n) => {
                *n = n.saturating_add(1);
                Ok(*n)
            },
            Value::Text(_) => Err(StoreError::NotACounter { key: key.to_string() }),
        }
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
