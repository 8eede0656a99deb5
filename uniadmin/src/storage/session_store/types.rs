use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::errors::StorageError;

/// Serialized session record plus its absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredData {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Server-side home of session records, keyed by `(prefix, key)`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a record that expires after `ttl` seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: String,
        ttl: u64,
    ) -> Result<(), StorageError>;

    /// Get a record. Expired records are reported as absent.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<StoredData>, StorageError>;

    /// Remove a record.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;

    /// Drop every expired record, returning how many were removed.
    async fn purge_expired(&mut self) -> Result<usize, StorageError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    pub(super) entry: HashMap<String, StoredData>,
}
