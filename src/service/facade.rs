//! Single-key reads and mutations over the published snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::loader::{ConfigSnapshot, LoadError, Loader, Origin};
use crate::metadata::{FieldMeta, Metadata};
use crate::store::{self, DynamicStore, StoredValue};

use super::{ServiceError, ValueSource};

/// Holds the current [`ConfigSnapshot`] and mediates every change to it.
///
/// Readers call [`snapshot`](Self::snapshot) or [`get_value`](Self::get_value)
/// and never wait on writers. [`update_value`](Self::update_value) and
/// [`delete_value`](Self::delete_value) are serialized; each persists its
/// change, rebuilds a full snapshot through the [`Loader`], and publishes it
/// only if it validates. A failed write or rebuild restores the previous
/// store record.
pub struct ConfigService<T, P> {
    loader: Loader,
    store: P,
    current: ArcSwap<ConfigSnapshot<T>>,
    write_lock: Mutex<()>,
}

impl<T, P> ConfigService<T, P>
where
    T: DeserializeOwned,
    P: DynamicStore,
{
    /// Loads the initial snapshot and publishes it as version 1.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the initial configuration cannot be built.
    pub async fn start(loader: Loader, store: P) -> Result<Self, LoadError> {
        let snapshot = loader.load::<T, P>(&store).await?.with_version(1);
        tracing::info!(version = 1, "Published initial configuration snapshot");
        Ok(Self {
            loader,
            store,
            current: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    /// The snapshot currently in effect.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ConfigSnapshot<T>> {
        self.current.load_full()
    }

    /// Field metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        self.loader.metadata()
    }

    /// The dynamic store.
    #[must_use]
    pub const fn store(&self) -> &P {
        &self.store
    }

    /// Reads one field from the current snapshot and reports where its
    /// value came from.
    ///
    /// The store is never consulted, so the answer always agrees with
    /// [`snapshot`](Self::snapshot). A record written to the store by
    /// anything other than this service shows up after the next reload.
    ///
    /// A declared field missing from the snapshot falls back to its default.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UnknownKey`] if the key names no field and no
    /// undeclared file value, or names a section rather than a value.
    pub fn get_value(&self, key: &str) -> Result<(Value, ValueSource), ServiceError> {
        let snapshot = self.snapshot();
        let meta = self.metadata().get(key);
        let unknown = || ServiceError::UnknownKey {
            key: key.to_string(),
        };

        if let Some(value) = snapshot.value(key) {
            let source = match snapshot.origin(key) {
                Some(Origin::Default) => ValueSource::Default,
                Some(Origin::Dynamic) => ValueSource::Dynamic,
                Some(Origin::Environment { .. }) => ValueSource::Environment,
                Some(Origin::File { .. }) => ValueSource::File,
                // Sections are not values.
                None if meta.is_none() && value.is_object() => return Err(unknown()),
                None => ValueSource::File,
            };
            return Ok((value.clone(), source));
        }

        meta.and_then(FieldMeta::default_value)
            .map(|value| (value.clone(), ValueSource::Default))
            .ok_or_else(unknown)
    }

    /// Sets a dynamic override and publishes the resulting snapshot.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::UnknownKey`] or [`ServiceError::Forbidden`] for a
    ///   key that cannot be overridden
    /// - [`ServiceError::Validation`] if `raw` breaks the field's rule or the
    ///   rebuilt configuration breaks any rule; the override is rolled back
    /// - [`ServiceError::Provider`] if the store fails or times out; a write
    ///   that may have landed is rolled back
    /// - [`ServiceError::RollbackFailed`] if restoring after a failed write
    ///   or rebuild fails
    ///
    /// # Cancellation
    ///
    /// Dropping the future never publishes a snapshot. Dropped after the
    /// store write, the new record stays in the store unconfirmed until the
    /// next successful reload picks it up.
    pub async fn update_value(&self, key: &str, raw: &str) -> Result<(), ServiceError> {
        let meta = self.eligible(key)?;
        meta.validate_raw(raw)?;

        let _guard = self.write_lock.lock().await;
        let timeout = self.loader.timeout();
        let previous = store::bounded(timeout, self.store.get_one(key)).await?;
        if let Err(err) = store::bounded(timeout, self.store.set_one(key, raw)).await {
            return Err(self.roll_back(key, previous, LoadError::Provider(err)).await);
        }
        tracing::debug!(key, "Persisted dynamic override");

        match self.loader.load::<T, P>(&self.store).await {
            Ok(snapshot) => {
                self.publish(snapshot, key);
                Ok(())
            }
            Err(cause) => Err(self.roll_back(key, previous, cause).await),
        }
    }

    /// Removes a dynamic override and publishes the resulting snapshot.
    ///
    /// Removing a key without an active override succeeds without reloading.
    ///
    /// # Errors
    ///
    /// Same as [`update_value`](Self::update_value); a failed rebuild
    /// restores the removed override.
    pub async fn delete_value(&self, key: &str) -> Result<(), ServiceError> {
        self.eligible(key)?;

        let _guard = self.write_lock.lock().await;
        let timeout = self.loader.timeout();
        let previous = store::bounded(timeout, self.store.get_one(key)).await?;
        let Some(previous) = previous.filter(|record| record.is_dynamic) else {
            tracing::debug!(key, "No dynamic override to delete");
            return Ok(());
        };
        if let Err(err) = store::bounded(timeout, self.store.delete_one(key)).await {
            return Err(self.roll_back(key, Some(previous), LoadError::Provider(err)).await);
        }
        tracing::debug!(key, "Deleted dynamic override");

        match self.loader.load::<T, P>(&self.store).await {
            Ok(snapshot) => {
                self.publish(snapshot, key);
                Ok(())
            }
            Err(cause) => Err(self.roll_back(key, Some(previous), cause).await),
        }
    }

    /// Every override the store reports, eligible or not.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Provider`] if the store fails.
    pub async fn list_dynamic_overrides(&self) -> Result<BTreeMap<String, String>, ServiceError> {
        let overrides = store::bounded(self.loader.timeout(), self.store.list_all()).await?;
        Ok(overrides)
    }

    /// Every dynamic path, whether or not it has an override.
    #[must_use]
    pub fn allowed_dynamic_keys(&self) -> BTreeSet<String> {
        self.metadata().dynamic_keys()
    }

    /// The current merged tree as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Render`] if serialization fails.
    pub fn snapshot_json(&self) -> Result<String, ServiceError> {
        self.snapshot().to_json_pretty().map_err(ServiceError::Render)
    }

    fn eligible(&self, key: &str) -> Result<&FieldMeta, ServiceError> {
        let meta = self.metadata().get(key).ok_or_else(|| ServiceError::UnknownKey {
            key: key.to_string(),
        })?;
        if meta.is_dynamic() {
            Ok(meta)
        } else {
            Err(ServiceError::Forbidden {
                key: key.to_string(),
            })
        }
    }

    fn publish(&self, snapshot: ConfigSnapshot<T>, key: &str) {
        let version = self.current.load().version() + 1;
        self.current.store(Arc::new(snapshot.with_version(version)));
        tracing::info!(version, key, "Published configuration snapshot");
    }

    /// Puts the store back to `previous` after a failed write or rebuild.
    ///
    /// A failed or timed-out write may still have landed, so it is undone
    /// the same way. Tried once. An inactive previous record cannot be written back
    /// through the store interface and is removed instead.
    async fn roll_back(
        &self,
        key: &str,
        previous: Option<StoredValue>,
        cause: LoadError,
    ) -> ServiceError {
        let timeout = self.loader.timeout();
        let restored = match previous.filter(|record| record.is_dynamic) {
            Some(record) => store::bounded(timeout, self.store.set_one(key, &record.value)).await,
            None => store::bounded(timeout, self.store.delete_one(key)).await,
        };

        match restored {
            Ok(()) => {
                tracing::warn!(key, error = %cause, "Change failed, rolled back dynamic override");
                ServiceError::from(cause)
            }
            Err(rollback) => {
                tracing::error!(
                    key,
                    error = %cause,
                    rollback_error = %rollback,
                    "Change failed and rollback failed, store is inconsistent with the published snapshot"
                );
                ServiceError::RollbackFailed {
                    key: key.to_string(),
                    cause,
                    rollback,
                }
            }
        }
    }
}

impl<T, P> std::fmt::Debug for ConfigService<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("layout", self.loader.layout())
            .field("version", &self.current.load().version())
            .finish_non_exhaustive()
    }
}
