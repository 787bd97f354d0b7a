//! Error types for schema registration.

use thiserror::Error;

/// Error type for [`SchemaRegistry`](super::SchemaRegistry) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The namespace is empty.
    #[error("Namespace cannot be empty")]
    EmptyNamespace,

    /// The namespace is not a lowercase identifier.
    #[error("Invalid namespace '{namespace}': expected a lowercase identifier like 'logger' or 'user_store'")]
    InvalidNamespace {
        /// The rejected namespace
        namespace: String,
    },

    /// The schema declares no fields.
    #[error("Schema for namespace '{namespace}' declares no fields")]
    EmptySchema {
        /// Namespace the schema was registered under
        namespace: String,
    },

    /// The namespace is already taken.
    #[error("Module '{namespace}' already registered")]
    Duplicate {
        /// The duplicated namespace
        namespace: String,
    },

    /// Registration attempted after metadata was extracted.
    #[error("Cannot register module '{namespace}': configuration has already been loaded")]
    Sealed {
        /// Namespace of the rejected registration
        namespace: String,
    },
}
