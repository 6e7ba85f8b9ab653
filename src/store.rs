//! Settings store abstraction and the in-memory implementation.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

/// Trait for the underlying key/value settings store.
///
/// Writes are idempotent at-least-once; concurrency discipline (ordering of
/// concurrent writers) is the store's own concern.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the raw value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Persist `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, mainly for tests and demos.
    pub fn seeded(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: RwLock::new(entries.into_iter().collect()),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        trace!(key, "MemoryStore::get");
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        trace!(key, "MemoryStore::set");
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
