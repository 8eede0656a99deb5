use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::storage::errors::StorageError;

use super::types::{InMemorySessionStore, SessionStore, StoredData};

const STORE_PREFIX: &str = "cache";

impl InMemorySessionStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{STORE_PREFIX}:{prefix}:{key}")
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: String,
        ttl: u64,
    ) -> Result<(), StorageError> {
        let expires_at = i64::try_from(ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| StorageError::Storage(format!("TTL out of range: {ttl}")))?;
        let data = StoredData { value, expires_at };
        self.entry.insert(Self::make_key(prefix, key), data);
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<StoredData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self
            .entry
            .get(&key)
            .filter(|data| data.expires_at > Utc::now())
            .cloned())
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.entry.remove(&Self::make_key(prefix, key));
        Ok(())
    }

    async fn purge_expired(&mut self) -> Result<usize, StorageError> {
        let now = Utc::now();
        let before = self.entry.len();
        self.entry.retain(|_, data| data.expires_at > now);
        let removed = before - self.entry.len();
        if removed > 0 {
            tracing::debug!("Purged {} expired session records", removed);
        }
        Ok(removed)
    }
}
