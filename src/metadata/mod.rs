//! Flat field metadata derived from the combined schema set.
//!
//! [`from_registry`] seals the schema registry, then walks the root schema
//! plus every registered module schema once, before the first load, and
//! produces a [`Metadata`] table keyed by dot-path. The table is immutable afterwards: eligibility of a path never
//! changes during a process lifetime.

mod error;
mod extract;


pub use error::MetadataError;
pub use extract::from_registry;
pub(crate) use extract::extract;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::schema::{FieldKind, Rule};
use crate::tree;
use crate::validation::{ValidationError, Violation};

/// Metadata of one leaf configuration field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    path: String,
    kind: FieldKind,
    default: Option<Value>,
    dynamic: bool,
    rule: Option<Rule>,
}

impl FieldMeta {
    pub(crate) const fn new(
        path: String,
        kind: FieldKind,
        default: Option<Value>,
        dynamic: bool,
        rule: Option<Rule>,
    ) -> Self {
        Self {
            path,
            kind,
            default,
            dynamic,
            rule,
        }
    }

    /// Dot-path of the field.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared value kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Typed code-embedded default.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the field may be overridden through the dynamic store.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Parsed validation rule.
    #[must_use]
    pub const fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    /// Coerces raw text from a string-typed source into this field's kind.
    ///
    /// # Errors
    ///
    /// Returns the reason if the text is not a valid value of the kind.
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        self.kind.coerce(raw)
    }

    /// Checks a candidate value against the field's kind and rule.
    ///
    /// # Errors
    ///
    /// Returns a [`Violation`] if the rule rejects the value.
    pub fn check(&self, value: Option<&Value>) -> Result<(), Violation> {
        // Files are not coerced, so their values may have any type
        if let Some(value) = value.filter(|value| !value.is_null() && !self.kind.accepts(value)) {
            return Err(Violation {
                path: self.path.clone(),
                rule: format!("kind={}", self.kind),
                reason: format!("expected {}, found {value}", self.kind),
            });
        }
        let Some(rule) = &self.rule else {
            return Ok(());
        };
        rule.check(value).map_err(|reason| Violation {
            path: self.path.clone(),
            rule: rule.source().to_string(),
            reason,
        })
    }

    /// Coerces raw text and checks it against the rule in one step.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if coercion or the rule fails.
    pub fn validate_raw(&self, raw: &str) -> Result<Value, ValidationError> {
        let value = self.coerce(raw).map_err(|reason| {
            ValidationError::single(&self.path, format!("kind={}", self.kind), reason)
        })?;
        self.check(Some(&value))
            .map_err(|violation| ValidationError::new(vec![violation]))?;
        Ok(value)
    }
}

/// Path-indexed table of [`FieldMeta`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    fields: BTreeMap<String, FieldMeta>,
}

impl Metadata {
    pub(crate) const fn from_fields(fields: BTreeMap<String, FieldMeta>) -> Self {
        Self { fields }
    }

    /// Metadata for `path`, if declared.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldMeta> {
        self.fields.get(path)
    }

    /// Returns `true` if `path` is declared.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Returns `true` if `path` is declared and dynamic.
    #[must_use]
    pub fn is_dynamic(&self, path: &str) -> bool {
        self.get(path).is_some_and(FieldMeta::is_dynamic)
    }

    /// Every dynamic path, whether or not it currently has an override.
    #[must_use]
    pub fn dynamic_keys(&self) -> BTreeSet<String> {
        self.fields
            .values()
            .filter(|meta| meta.is_dynamic())
            .map(|meta| meta.path.clone())
            .collect()
    }

    /// Iterates fields in path order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.values()
    }

    /// Number of declared leaf fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates a merged tree against every declared rule.
    ///
    /// # Errors
    ///
    /// Returns every violation found; any single one fails the whole tree.
    pub fn validate(&self, merged: &Value) -> Result<(), ValidationError> {
        let violations: Vec<Violation> = self
            .iter()
            .filter_map(|meta| meta.check(tree::lookup(merged, meta.path())).err())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}
