//! Declarative configuration schemas.
//!
//! This module provides:
//! - Field descriptors ([`Schema`], [`Field`], [`FieldKind`])
//! - The validation rule language ([`Rule`])
//! - The module schema registry ([`SchemaRegistry`])
//! - The built-in root and logger schemas ([`builtin`])

pub mod builtin;
mod error;
mod field;
mod registry;
mod rule;

#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod rule_tests;

pub use error::RegistryError;
pub use field::{Field, FieldKind, FieldShape, Schema};
pub use registry::SchemaRegistry;
pub use rule::Rule;
