//! Dynamic override persistence.
//!
//! This module provides the [`DynamicStore`] abstraction the loader and
//! the service consume, plus two backends:
//! - [`MemoryStore`]: process-local, for embedding and tests
//! - [`FileStore`]: a JSON file with atomic writes

mod file;
mod memory;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One persisted override record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// Raw value text; coerced by the field's kind when applied.
    pub value: String,
    /// Whether the record is an active dynamic override.
    pub is_dynamic: bool,
}

impl StoredValue {
    /// Creates an active dynamic override record.
    #[must_use]
    pub fn dynamic(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_dynamic: true,
        }
    }
}

/// Errors raised by a [`DynamicStore`] backend.
///
/// No retries happen inside this crate; a transient failure is returned
/// to the caller as-is.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Reading or writing the backing storage failed.
    #[error("Dynamic store I/O failed: {0}")]
    Io(#[source] io::Error),

    /// The backing storage holds unreadable data.
    #[error("Dynamic store is corrupted: {reason}")]
    Corrupted {
        /// What was wrong with the stored data
        reason: String,
    },

    /// Failed to serialize records.
    #[error("Failed to serialize dynamic store: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The call did not complete within the configured bound.
    #[error("Dynamic store call timed out after {0:?}")]
    Timeout(Duration),

    /// Backend-specific failure from an external implementation.
    #[error("Dynamic store backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Key/value collaborator holding runtime overrides.
///
/// Implementations should:
/// - Return `Ok(None)` from [`get_one`](Self::get_one) for absent keys
/// - Treat [`delete_one`](Self::delete_one) on an absent key as a no-op
/// - Only report active (`is_dynamic`) records from [`list_all`](Self::list_all)
///
/// The store does not know which keys are eligible; the loader and the
/// service filter by field metadata.
pub trait DynamicStore: Send + Sync {
    /// Returns the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_one(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<StoredValue>, ProviderError>> + Send;

    /// Persists `value` under `key` as an active override.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_one(&self, key: &str, value: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Returns every active override.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_all(&self) -> impl Future<Output = Result<BTreeMap<String, String>, ProviderError>> + Send;

    /// Removes the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete_one(&self, key: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// Runs a store call, failing with [`ProviderError::Timeout`] if it
/// outlives `limit`. Dropping the call on expiry cancels it.
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ProviderError::Timeout(limit))?,
        None => call.await,
    }
}
