//! Boot-time wiring of registry, metadata, loader and service.
//!
//! A [`Bootstrap`] is the one context object a process builds at startup.
//! Modules register their schemas on [`Bootstrap::registry`]; the first
//! call that needs metadata seals the registry and extracts it once.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::loader::{ConfigLayout, ConfigSnapshot, Environment, LoadError, Loader};
use crate::metadata::{self, Metadata, MetadataError};
use crate::schema::{RegistryError, Schema, SchemaRegistry, builtin};
use crate::service::ConfigService;
use crate::store::DynamicStore;

/// Error type for boot-time failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A module schema could not be registered.
    #[error("Failed to register module schema: {0}")]
    Registry(#[from] RegistryError),

    /// The combined schemas are inconsistent.
    #[error("Invalid configuration schema: {0}")]
    Metadata(#[from] MetadataError),

    /// The initial configuration could not be built.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Failed to write the configuration template.
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Process-wide configuration context.
#[derive(Debug)]
pub struct Bootstrap {
    layout: ConfigLayout,
    root: Schema,
    registry: Arc<SchemaRegistry>,
    environment: Environment,
    env_prefix: Option<String>,
    timeout: Option<Duration>,
    metadata: OnceLock<Arc<Metadata>>,
}

impl Bootstrap {
    /// Uses the built-in root schema and an empty registry.
    #[must_use]
    pub fn new(layout: ConfigLayout) -> Self {
        Self {
            layout,
            root: builtin::root_schema(),
            registry: Arc::new(SchemaRegistry::new()),
            environment: Environment::default(),
            env_prefix: None,
            timeout: None,
            metadata: OnceLock::new(),
        }
    }

    /// Replaces the root schema.
    #[must_use]
    pub fn with_root_schema(mut self, root: Schema) -> Self {
        self.root = root;
        self
    }

    /// Shares an existing registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the environment source.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the environment variable prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Bounds every dynamic store call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registry modules contribute their schemas to.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// File layout.
    #[must_use]
    pub const fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    /// Field metadata, extracted on first use.
    ///
    /// Seals the registry.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] if the combined schemas are inconsistent.
    pub fn metadata(&self) -> Result<Arc<Metadata>, MetadataError> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(Arc::clone(metadata));
        }

        let extracted = Arc::new(metadata::from_registry(&self.root, &self.registry)?);
        Ok(Arc::clone(self.metadata.get_or_init(|| extracted)))
    }

    /// A loader over the extracted metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] if the combined schemas are inconsistent.
    pub fn loader(&self) -> Result<Loader, MetadataError> {
        let mut loader = Loader::new(self.metadata()?, self.layout.clone())
            .with_environment(self.environment.clone());
        if let Some(prefix) = &self.env_prefix {
            loader = loader.with_env_prefix(prefix.clone());
        }
        if let Some(timeout) = self.timeout {
            loader = loader.with_timeout(timeout);
        }
        Ok(loader)
    }

    /// Resolves every layer except the dynamic store.
    ///
    /// Lets the process read the settings it needs to open its store.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] if metadata extraction or loading fails.
    pub async fn load_initial<T: DeserializeOwned>(&self) -> Result<ConfigSnapshot<T>, BootstrapError> {
        let snapshot = self.loader()?.load_static().await?;
        Ok(snapshot)
    }

    /// Loads the full configuration and starts the service.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] if metadata extraction or loading fails.
    pub async fn start<T, P>(&self, store: P) -> Result<ConfigService<T, P>, BootstrapError>
    where
        T: DeserializeOwned,
        P: DynamicStore,
    {
        let service = ConfigService::start(self.loader()?, store).await?;
        Ok(service)
    }
}

/// Writes the commented base file template into `dir`.
///
/// Returns the written path. An existing base file is left untouched.
///
/// # Errors
///
/// Returns [`BootstrapError::FileWrite`] if the directory cannot be created,
/// the file already exists or cannot be written.
pub fn write_default_config(dir: &Path) -> Result<PathBuf, BootstrapError> {
    let layout = ConfigLayout::new(dir);
    let path = layout.base_path();
    let write_error = |source| BootstrapError::FileWrite {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_error)?;
    std::fs::create_dir_all(layout.drop_in_path()).map_err(write_error)?;
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .and_then(|mut file| {
            std::io::Write::write_all(&mut file, builtin::default_config_template().as_bytes())
        })
        .map_err(write_error)?;
    Ok(path)
}
