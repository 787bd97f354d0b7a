//! In-memory store implementation.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{DynamicStore, ProviderError, StoredValue};

/// Process-local implementation of [`DynamicStore`].
///
/// Nothing survives a restart. Useful for embedding the engine without a
/// persistence backend and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an active override.
    #[must_use]
    pub fn with_override(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_record(key, StoredValue::dynamic(value))
    }

    /// Seeds an arbitrary record, including inactive ones.
    #[must_use]
    pub fn with_record(self, key: impl Into<String>, record: StoredValue) -> Self {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), record);
        self
    }

    /// Returns the record stored under `key` without going through the
    /// async trait.
    #[must_use]
    pub fn record(&self, key: &str) -> Option<StoredValue> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of stored records, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DynamicStore for MemoryStore {
    async fn get_one(&self, key: &str) -> Result<Option<StoredValue>, ProviderError> {
        Ok(self.record(key))
    }

    async fn set_one(&self, key: &str, value: &str) -> Result<(), ProviderError> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), StoredValue::dynamic(value));
        Ok(())
    }

    async fn list_all(&self) -> Result<BTreeMap<String, String>, ProviderError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, record)| record.is_dynamic)
            .map(|(key, record)| (key.clone(), record.value.clone()))
            .collect())
    }

    async fn delete_one(&self, key: &str) -> Result<(), ProviderError> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
