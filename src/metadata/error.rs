//! Error types for metadata extraction.

use thiserror::Error;

use crate::schema::FieldKind;

/// A schema-authoring defect found while extracting metadata.
///
/// Fatal: the engine cannot start with an inconsistent field set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// Two schemas (or two fields of one schema) produce the same path.
    #[error("Duplicate configuration path '{path}': declared by {first} and by {second}")]
    DuplicatePath {
        /// The colliding dot-path
        path: String,
        /// Owner of the first declaration
        first: String,
        /// Owner of the second declaration
        second: String,
    },

    /// A field name or key cannot be used as a path segment.
    #[error("Invalid field key '{key}' under '{parent}': {reason}")]
    InvalidKey {
        /// Path of the enclosing section (empty at the root)
        parent: String,
        /// The rejected key
        key: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A validation rule failed to parse.
    #[error("Invalid validation rule '{rule}' for '{path}': {reason}")]
    InvalidRule {
        /// Field path
        path: String,
        /// Rule text
        rule: String,
        /// Parse failure
        reason: String,
    },

    /// A leaf-only attribute was declared on a section.
    #[error("Section '{path}' cannot declare a {attribute}; only leaf fields can")]
    CompositeAttribute {
        /// Section path
        path: String,
        /// `"dynamic flag"`, `"default"` or `"validation rule"`
        attribute: &'static str,
    },

    /// A default value does not match the declared kind.
    #[error("Default for '{path}' must be a {kind}, got {value}")]
    DefaultKindMismatch {
        /// Field path
        path: String,
        /// Declared kind
        kind: FieldKind,
        /// Offending default, rendered as JSON
        value: String,
    },
}
