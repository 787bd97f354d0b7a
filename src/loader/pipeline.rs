//! The six-layer resolution pipeline.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::metadata::Metadata;
use crate::store::{self, DynamicStore};
use crate::tree;

use super::env::{Environment, env_var_name};
use super::layout::{self, ConfigLayout};
use super::snapshot::{ConfigSnapshot, FileLayer, Origin};
use super::LoadError;

/// Builds validated [`ConfigSnapshot`]s from metadata, files, the dynamic
/// store and the environment.
///
/// Layers, lowest priority first:
/// 1. Code-embedded defaults
/// 2. Base file
/// 3. Domain files, in filename order
/// 4. Drop-in files, in filename order
/// 5. Dynamic overrides of eligible fields
/// 6. Environment variables
///
/// A load performs no writes. Calling it twice with unchanged inputs yields
/// equal snapshots.
#[derive(Debug, Clone)]
pub struct Loader {
    metadata: Arc<Metadata>,
    layout: ConfigLayout,
    environment: Environment,
    env_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl Loader {
    /// Creates a loader reading files from `layout` and the process
    /// environment without a prefix.
    #[must_use]
    pub fn new(metadata: Arc<Metadata>, layout: ConfigLayout) -> Self {
        Self {
            metadata,
            layout,
            environment: Environment::default(),
            env_prefix: None,
            timeout: None,
        }
    }

    /// Replaces the environment source.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the prefix of recognized environment variables.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Bounds every dynamic store call made through this loader.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Field metadata.
    #[must_use]
    pub fn metadata(&self) -> &Arc<Metadata> {
        &self.metadata
    }

    /// File layout.
    #[must_use]
    pub const fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    /// Per-call store timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Environment variable name of a field under this loader's prefix.
    #[must_use]
    pub fn env_var(&self, path: &str) -> String {
        env_var_name(self.env_prefix.as_deref(), path)
    }

    /// Resolves all six layers.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if a file is unreadable or malformed, the store
    /// fails, a string value does not fit its field, decoding fails, or any
    /// rule is broken.
    pub async fn load<T, P>(&self, store: &P) -> Result<ConfigSnapshot<T>, LoadError>
    where
        T: DeserializeOwned,
        P: DynamicStore,
    {
        let overrides = store::bounded(self.timeout, store.list_all()).await?;
        self.resolve(Some(overrides)).await
    }

    /// Resolves every layer except the dynamic store.
    ///
    /// Used before a store exists, e.g. to read its connection settings.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus store failures.
    pub async fn load_static<T: DeserializeOwned>(&self) -> Result<ConfigSnapshot<T>, LoadError> {
        self.resolve(None).await
    }

    async fn resolve<T: DeserializeOwned>(
        &self,
        overrides: Option<BTreeMap<String, String>>,
    ) -> Result<ConfigSnapshot<T>, LoadError> {
        let mut acc = Accumulator::default();

        acc.apply_defaults(&self.metadata);

        let base = self.layout.base_path();
        acc.apply_file(&self.metadata, FileLayer::Base, &base).await?;
        for path in self.layout.domain_files().await? {
            acc.apply_file(&self.metadata, FileLayer::Domain, &path).await?;
        }
        for path in self.layout.drop_in_files().await? {
            acc.apply_file(&self.metadata, FileLayer::DropIn, &path).await?;
        }

        if let Some(overrides) = overrides {
            acc.apply_overrides(&self.metadata, overrides)?;
        }
        acc.apply_environment(&self.metadata, |path| {
            let var = self.env_var(path);
            self.environment.var(&var).map(|value| (var, value))
        })?;

        let Accumulator { tree, origins } = acc;
        let config: T = serde_json::from_value(tree.clone()).map_err(LoadError::Decode)?;
        self.metadata.validate(&tree)?;

        tracing::debug!(fields = origins.len(), "Configuration resolved");
        Ok(ConfigSnapshot::new(config, tree, origins))
    }
}

/// Merged tree plus the origin of every declared field it holds.
struct Accumulator {
    tree: Value,
    origins: BTreeMap<String, Origin>,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            tree: Value::Object(Map::new()),
            origins: BTreeMap::new(),
        }
    }
}

impl Accumulator {
    fn set(&mut self, path: &str, value: Value, origin: Origin) {
        tree::insert(&mut self.tree, path, value);
        self.origins.insert(path.to_string(), origin);
    }

    fn apply_defaults(&mut self, metadata: &Metadata) {
        let mut applied = 0_usize;
        for meta in metadata.iter() {
            if let Some(default) = meta.default_value() {
                self.set(meta.path(), default.clone(), Origin::Default);
                applied += 1;
            }
        }
        tracing::debug!(fields = applied, "Applied defaults");
    }

    async fn apply_file(
        &mut self,
        metadata: &Metadata,
        layer: FileLayer,
        path: &Path,
    ) -> Result<(), LoadError> {
        let Some(layer_tree) = layout::read_file(path).await? else {
            tracing::debug!(file = %path.display(), "Optional config file not found, skipping");
            return Ok(());
        };

        for meta in metadata.iter() {
            if tree::lookup(&layer_tree, meta.path()).is_some() {
                self.origins.insert(
                    meta.path().to_string(),
                    Origin::File {
                        layer,
                        path: path.to_path_buf(),
                    },
                );
            }
        }

        let base = std::mem::take(&mut self.tree);
        self.tree = tree::deep_merge(base, layer_tree);
        tracing::debug!(file = %path.display(), ?layer, "Applied config file");
        Ok(())
    }

    fn apply_overrides(
        &mut self,
        metadata: &Metadata,
        overrides: BTreeMap<String, String>,
    ) -> Result<(), LoadError> {
        let mut applied = 0_usize;
        for (key, raw) in overrides {
            let Some(meta) = metadata.get(&key) else {
                tracing::warn!(key = %key, "Ignoring dynamic override for unknown key");
                continue;
            };
            if !meta.is_dynamic() {
                tracing::warn!(key = %key, "Ignoring dynamic override for non-dynamic key");
                continue;
            }
            let value = meta.coerce(&raw).map_err(|reason| LoadError::InvalidValue {
                path: key.clone(),
                origin: format!("dynamic override '{key}'"),
                reason,
            })?;
            self.set(&key, value, Origin::Dynamic);
            applied += 1;
        }
        tracing::debug!(overrides = applied, "Applied dynamic overrides");
        Ok(())
    }

    fn apply_environment<F>(&mut self, metadata: &Metadata, lookup: F) -> Result<(), LoadError>
    where
        F: Fn(&str) -> Option<(String, String)>,
    {
        let mut applied = 0_usize;
        for meta in metadata.iter() {
            let Some((var, raw)) = lookup(meta.path()) else {
                continue;
            };
            let value = meta.coerce(&raw).map_err(|reason| LoadError::InvalidValue {
                path: meta.path().to_string(),
                origin: format!("environment variable {var}"),
                reason,
            })?;
            self.set(meta.path(), value, Origin::Environment { var });
            applied += 1;
        }
        tracing::debug!(variables = applied, "Applied environment");
        Ok(())
    }
}
