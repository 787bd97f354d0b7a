//! Errors returned by [`ConfigService`](super::ConfigService).

use thiserror::Error;

use crate::loader::LoadError;
use crate::store::ProviderError;
use crate::validation::ValidationError;

/// Error type for service operations.
///
/// Except for [`RollbackFailed`](Self::RollbackFailed), a failed call
/// leaves both the store and the published snapshot as they were.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No field is declared at this path.
    #[error("Unknown configuration key '{key}'")]
    UnknownKey {
        /// Requested key
        key: String,
    },

    /// The field exists but cannot be changed at runtime.
    #[error("Configuration key '{key}' is not dynamically overridable")]
    Forbidden {
        /// Requested key
        key: String,
    },

    /// The candidate value or the resulting configuration breaks a rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rebuilding the configuration failed for a reason other than a rule.
    #[error("Failed to reload configuration: {0}")]
    Load(#[source] LoadError),

    /// The dynamic store failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A store write or reload failed and restoring the previous store
    /// record failed too.
    ///
    /// The store now holds a record that no published snapshot reflects.
    #[error(
        "Change to '{key}' failed ({cause}) and restoring the previous value also failed: {rollback}"
    )]
    RollbackFailed {
        /// Key whose record is left inconsistent
        key: String,
        /// Why the write or reload failed
        #[source]
        cause: LoadError,
        /// Why the restore failed
        rollback: ProviderError,
    },

    /// Rendering the snapshot failed.
    #[error("Failed to render configuration: {0}")]
    Render(#[source] serde_json::Error),
}

impl From<LoadError> for ServiceError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Validation(validation) => Self::Validation(validation),
            LoadError::Provider(provider) => Self::Provider(provider),
            other => Self::Load(other),
        }
    }
}
