//! Append-only table of module schemas.

use std::collections::BTreeMap;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;

use super::{RegistryError, Schema};

/// Namespaces become path prefixes and environment variable prefixes,
/// so they are restricted to lowercase identifiers.
static NAMESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("namespace pattern is valid"));

#[derive(Debug, Default)]
struct RegistryState {
    modules: BTreeMap<String, Schema>,
    sealed: bool,
}

/// Thread-safe registry mapping a namespace to a module [`Schema`].
///
/// Independently developed modules contribute configuration fields here
/// during boot. Registration takes the write lock; lookups take the read
/// lock and may run concurrently at any time.
///
/// The registry is sealed when metadata is extracted. Any later
/// [`register`](Self::register) call fails with [`RegistryError::Sealed`],
/// so the extractor always sees the complete field set.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    state: RwLock<RegistryState>,
}

impl SchemaRegistry {
    /// Creates an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a module schema under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The namespace is empty or not a lowercase identifier
    /// - The schema declares no fields
    /// - The namespace is already registered
    /// - The registry has been sealed
    pub fn register(&self, namespace: impl Into<String>, schema: Schema) -> Result<(), RegistryError> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(RegistryError::EmptyNamespace);
        }
        if !NAMESPACE_PATTERN.is_match(&namespace) {
            return Err(RegistryError::InvalidNamespace { namespace });
        }
        if schema.is_empty() {
            return Err(RegistryError::EmptySchema { namespace });
        }

        let mut state = self.write();
        if state.sealed {
            return Err(RegistryError::Sealed { namespace });
        }
        if state.modules.contains_key(&namespace) {
            return Err(RegistryError::Duplicate { namespace });
        }

        tracing::debug!(namespace = %namespace, fields = schema.len(), "Registered module schema");
        state.modules.insert(namespace, schema);
        Ok(())
    }

    /// Returns the schema registered under `namespace`.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<Schema> {
        self.read().modules.get(namespace).cloned()
    }

    /// Returns `true` if `namespace` is registered.
    #[must_use]
    pub fn has(&self, namespace: &str) -> bool {
        self.read().modules.contains_key(namespace)
    }

    /// Returns a copy of every registered schema, ordered by namespace.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<String, Schema> {
        self.read().modules.clone()
    }

    /// Number of registered modules.
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().modules.len()
    }

    /// Closes the registry to further registration. Idempotent.
    pub fn seal(&self) {
        self.write().sealed = true;
    }

    /// Returns `true` once [`seal`](Self::seal) has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.read().sealed
    }
}
