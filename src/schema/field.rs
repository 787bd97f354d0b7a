//! Declarative field descriptors.
//!
//! A [`Schema`] is plain data: every field is registered with its key,
//! kind, default, dynamic eligibility and validation rule. Nothing is
//! inferred from Rust types at runtime.

use std::fmt;

use serde_json::{Number, Value};

/// Scalar kind of a leaf field.
///
/// The kind drives how string-typed sources (environment variables and
/// dynamic overrides) are coerced into the merged tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Finite floating point number.
    Float,
    /// `true` / `false`.
    Boolean,
    /// List of strings.
    StringList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::StringList => "string list",
        };
        f.write_str(name)
    }
}

impl FieldKind {
    /// Returns `true` if an already-typed value is valid for this kind.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    /// Converts raw text into a typed value of this kind.
    ///
    /// Lists accept either a JSON array of strings or comma-separated text.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the text is not a valid value.
    pub fn coerce(self, raw: &str) -> Result<Value, String> {
        let trimmed = raw.trim();
        match self {
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("'{raw}' is not an integer: {e}")),
            Self::Float => {
                let number = trimmed
                    .parse::<f64>()
                    .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
                Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| format!("'{raw}' is not a finite number"))
            }
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(format!("'{raw}' is not a boolean")),
            },
            Self::StringList => coerce_list(trimmed),
        }
    }
}

fn coerce_list(trimmed: &str) -> Result<Value, String> {
    if trimmed.starts_with('[') {
        let items: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|e| format!("'{trimmed}' is not a JSON list of strings: {e}"))?;
        return Ok(Value::from(items));
    }

    let items: Vec<Value> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(Value::from)
        .collect();
    Ok(Value::Array(items))
}

/// Whether a field holds a value or nests further fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    /// A leaf holding a value of the given kind.
    Leaf(FieldKind),
    /// A composite section containing nested fields.
    Section(Schema),
}

/// One entry of a [`Schema`].
///
/// Built with the kind constructors ([`Field::string`], [`Field::integer`], ...)
/// or [`Field::section`], then refined with the builder methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    key: Option<String>,
    shape: FieldShape,
    default: Option<Value>,
    dynamic: bool,
    rule: Option<String>,
}

impl Field {
    fn leaf(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            key: None,
            shape: FieldShape::Leaf(kind),
            default: None,
            dynamic: false,
            rule: None,
        }
    }

    /// Creates a string field.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::leaf(name, FieldKind::String)
    }

    /// Creates an integer field.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::leaf(name, FieldKind::Integer)
    }

    /// Creates a floating point field.
    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::leaf(name, FieldKind::Float)
    }

    /// Creates a boolean field.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::leaf(name, FieldKind::Boolean)
    }

    /// Creates a string list field.
    #[must_use]
    pub fn string_list(name: impl Into<String>) -> Self {
        Self::leaf(name, FieldKind::StringList)
    }

    /// Creates a composite field whose children are the fields of `schema`.
    #[must_use]
    pub fn section(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            key: None,
            shape: FieldShape::Section(schema),
            default: None,
            dynamic: false,
            rule: None,
        }
    }

    /// Declares the key used in paths instead of the field name.
    #[must_use]
    pub fn renamed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the code-embedded default (layer 1).
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the field as overridable at runtime through the dynamic store.
    #[must_use]
    pub const fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Attaches a validation rule such as `"required,min=1"`.
    #[must_use]
    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Declared field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key used when building dot-paths: the override name if declared,
    /// otherwise the field name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Leaf kind or nested schema.
    #[must_use]
    pub const fn shape(&self) -> &FieldShape {
        &self.shape
    }

    /// Code-embedded default, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the field was marked dynamic.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Raw validation rule text, if any.
    #[must_use]
    pub fn rule_source(&self) -> Option<&str> {
        self.rule.as_deref()
    }
}

/// An ordered set of field descriptors.
///
/// The root schema and every module schema contributed through the
/// [`SchemaRegistry`](super::SchemaRegistry) share this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a nested section.
    #[must_use]
    pub fn section(self, name: impl Into<String>, schema: Self) -> Self {
        self.field(Field::section(name, schema))
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
