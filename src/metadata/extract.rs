//! Schema walk producing the flat metadata table.

use std::collections::BTreeMap;

use crate::defaults::PATH_SEPARATOR;
use crate::schema::{Field, FieldShape, Rule, Schema, SchemaRegistry};

use super::{FieldMeta, Metadata, MetadataError};

/// Seals `registry` and builds the metadata table from `root` plus every
/// module registered so far.
///
/// Once this returns, [`SchemaRegistry::register`] fails with
/// [`RegistryError::Sealed`](crate::schema::RegistryError::Sealed), so no
/// module can be added behind the table's back.
///
/// # Errors
///
/// Same as [`extract`].
pub fn from_registry(root: &Schema, registry: &SchemaRegistry) -> Result<Metadata, MetadataError> {
    registry.seal();
    extract(root, &registry.get_all())
}

/// Builds the metadata table from the root schema and every module schema.
///
/// Module fields are nested under their namespace, so module `logger`
/// declaring `level` yields the path `logger.level`.
///
/// # Errors
///
/// Returns an error if:
/// - Two declarations produce the same path, or one path is both a leaf
///   and a section
/// - A key is empty or contains the path separator or whitespace
/// - A validation rule is malformed
/// - A section declares a dynamic flag, default or rule
/// - A default does not match its field's kind
pub(crate) fn extract(root: &Schema, modules: &BTreeMap<String, Schema>) -> Result<Metadata, MetadataError> {
    let mut extractor = Extractor::default();
    extractor.walk(root, "", "the root schema")?;

    for (namespace, schema) in modules {
        let owner = format!("module '{namespace}'");
        extractor.claim_section(namespace, &owner)?;
        extractor.walk(schema, namespace, &owner)?;
    }

    tracing::debug!(fields = extractor.fields.len(), modules = modules.len(), "Extracted field metadata");
    Ok(Metadata::from_fields(extractor.fields))
}

#[derive(Default)]
struct Extractor {
    fields: BTreeMap<String, FieldMeta>,
    leaf_owners: BTreeMap<String, String>,
    section_owners: BTreeMap<String, String>,
}

impl Extractor {
    fn walk(&mut self, schema: &Schema, parent: &str, owner: &str) -> Result<(), MetadataError> {
        for field in schema.fields() {
            let path = child_path(parent, field)?;
            match field.shape() {
                FieldShape::Section(inner) => {
                    reject_section_attributes(field, &path)?;
                    self.claim_section(&path, owner)?;
                    self.walk(inner, &path, owner)?;
                }
                FieldShape::Leaf(kind) => {
                    if let Some(default) = field.default_value() {
                        if !kind.accepts(default) {
                            return Err(MetadataError::DefaultKindMismatch {
                                path,
                                kind: *kind,
                                value: default.to_string(),
                            });
                        }
                    }
                    let rule = field
                        .rule_source()
                        .map(|source| {
                            Rule::parse(source, *kind).map_err(|reason| MetadataError::InvalidRule {
                                path: path.clone(),
                                rule: source.to_string(),
                                reason,
                            })
                        })
                        .transpose()?;

                    self.claim_leaf(&path, owner)?;
                    let meta = FieldMeta::new(
                        path.clone(),
                        *kind,
                        field.default_value().cloned(),
                        field.is_dynamic(),
                        rule,
                    );
                    self.fields.insert(path, meta);
                }
            }
        }
        Ok(())
    }

    fn claim_leaf(&mut self, path: &str, owner: &str) -> Result<(), MetadataError> {
        let existing = self
            .leaf_owners
            .get(path)
            .or_else(|| self.section_owners.get(path));
        if let Some(first) = existing {
            return Err(duplicate(path, first, owner));
        }
        self.leaf_owners.insert(path.to_string(), owner.to_string());
        Ok(())
    }

    /// Sections may be contributed to by several owners; only a clash with
    /// a leaf at the same path is an error.
    fn claim_section(&mut self, path: &str, owner: &str) -> Result<(), MetadataError> {
        if let Some(first) = self.leaf_owners.get(path) {
            return Err(duplicate(path, first, owner));
        }
        self.section_owners
            .entry(path.to_string())
            .or_insert_with(|| owner.to_string());
        Ok(())
    }
}

fn duplicate(path: &str, first: &str, second: &str) -> MetadataError {
    MetadataError::DuplicatePath {
        path: path.to_string(),
        first: first.to_string(),
        second: second.to_string(),
    }
}

fn child_path(parent: &str, field: &Field) -> Result<String, MetadataError> {
    let key = field.key();
    let reason = if key.is_empty() {
        Some("key cannot be empty")
    } else if key.contains(PATH_SEPARATOR) {
        Some("key cannot contain '.'")
    } else if key.chars().any(char::is_whitespace) {
        Some("key cannot contain whitespace")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(MetadataError::InvalidKey {
            parent: parent.to_string(),
            key: key.to_string(),
            reason,
        });
    }

    if parent.is_empty() {
        Ok(key.to_string())
    } else {
        Ok(format!("{parent}{PATH_SEPARATOR}{key}"))
    }
}

fn reject_section_attributes(field: &Field, path: &str) -> Result<(), MetadataError> {
    let attribute = if field.is_dynamic() {
        Some("dynamic flag")
    } else if field.default_value().is_some() {
        Some("default")
    } else if field.rule_source().is_some() {
        Some("validation rule")
    } else {
        None
    };

    attribute.map_or(Ok(()), |attribute| {
        Err(MetadataError::CompositeAttribute {
            path: path.to_string(),
            attribute,
        })
    })
}
