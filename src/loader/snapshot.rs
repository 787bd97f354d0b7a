//! Resolved configuration snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::tree;

use super::LoadError;

/// File layer a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLayer {
    /// Layer 2, the base file.
    Base,
    /// Layer 3, a domain file.
    Domain,
    /// Layer 4, a drop-in file.
    DropIn,
}

/// Layer that last set a field's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Layer 1, the code-embedded default.
    Default,
    /// Layers 2 to 4.
    File {
        /// Which file layer
        layer: FileLayer,
        /// The file
        path: PathBuf,
    },
    /// Layer 5, a dynamic override.
    Dynamic,
    /// Layer 6.
    Environment {
        /// Variable name
        var: String,
    },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::File { path, .. } => write!(f, "file {}", path.display()),
            Self::Dynamic => f.write_str("dynamic override"),
            Self::Environment { var } => write!(f, "environment variable {var}"),
        }
    }
}

/// One complete, validated, immutable configuration.
///
/// Holds the typed configuration, the merged tree it was decoded from,
/// and the origin of every declared field that has a value. Readers get
/// it behind an `Arc` and never see it change.
#[derive(Debug)]
pub struct ConfigSnapshot<T> {
    config: T,
    tree: Value,
    origins: BTreeMap<String, Origin>,
    version: u64,
}

impl<T> ConfigSnapshot<T> {
    pub(crate) const fn new(config: T, tree: Value, origins: BTreeMap<String, Origin>) -> Self {
        Self {
            config,
            tree,
            origins,
            version: 0,
        }
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Typed configuration.
    #[must_use]
    pub const fn config(&self) -> &T {
        &self.config
    }

    /// Merged value tree.
    #[must_use]
    pub const fn tree(&self) -> &Value {
        &self.tree
    }

    /// Value at a dot-path.
    #[must_use]
    pub fn value(&self, path: &str) -> Option<&Value> {
        tree::lookup(&self.tree, path)
    }

    /// Layer that set the value of a declared field.
    #[must_use]
    pub fn origin(&self, path: &str) -> Option<&Origin> {
        self.origins.get(path)
    }

    /// Origins of every declared field with a value.
    #[must_use]
    pub const fn origins(&self) -> &BTreeMap<String, Origin> {
        &self.origins
    }

    /// Publication counter: `1` for the boot snapshot, incremented on every
    /// successful update or delete. `0` for snapshots not published by a
    /// service.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Decodes a module section into its typed settings.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DecodeSection`] if the section does not fit `M`.
    pub fn section<M: DeserializeOwned>(&self, namespace: &str) -> Result<M, LoadError> {
        let section = self.value(namespace).cloned().unwrap_or(Value::Null);
        serde_json::from_value(section).map_err(|source| LoadError::DecodeSection {
            namespace: namespace.to_string(),
            source,
        })
    }

    /// Renders the merged tree as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.tree)
    }
}
