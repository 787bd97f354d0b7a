//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::ProviderError;
use crate::validation::ValidationError;

/// Error type for a [`Loader`](super::Loader) run.
///
/// A missing optional file is never an error.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to list a configuration directory.
    #[error("Failed to read config directory '{}': {source}", path.display())]
    ReadDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML.
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        /// Path to the config file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A string-typed source holds text that does not fit the field kind.
    #[error("Invalid value for '{path}' from {origin}: {reason}")]
    InvalidValue {
        /// Field path
        path: String,
        /// Where the text came from, e.g. `environment variable APP_PORT`
        origin: String,
        /// Coercion failure
        reason: String,
    },

    /// Listing dynamic overrides failed.
    #[error("Failed to read dynamic overrides: {0}")]
    Provider(#[from] ProviderError),

    /// The merged tree does not decode into the typed configuration.
    #[error("Failed to decode merged configuration: {0}")]
    Decode(#[source] serde_json::Error),

    /// A module section does not decode into its typed settings.
    #[error("Failed to decode section '{namespace}': {source}")]
    DecodeSection {
        /// Module namespace
        namespace: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// The decoded configuration breaks one or more rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
