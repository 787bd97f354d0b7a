//! Validation rule language.
//!
//! Rules are comma-separated constraint lists parsed once, when metadata is
//! extracted, and evaluated against candidate values afterwards:
//!
//! | Constraint  | Meaning                                                    |
//! |-------------|------------------------------------------------------------|
//! | `required`  | value must be present and not an empty string or list      |
//! | `omitempty` | skip remaining checks for empty strings, lists, `0`, `false` |
//! | `min=N`     | length (strings, lists) or value (numbers) is at least `N` |
//! | `max=N`     | length or value is at most `N`                             |
//! | `len=N`     | length or value is exactly `N`                             |
//! | `oneof=a b` | value is one of the space-separated options                |
//! | `url`       | value parses as an absolute URL                            |
//! | `dive`      | apply the remaining constraints to every list element      |

use std::fmt;

use serde_json::Value;
use url::Url;

use super::FieldKind;

/// A single value constraint.
#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    Min(f64),
    Max(f64),
    Len(f64),
    OneOf(Vec<String>),
    Url,
}

impl Constraint {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::Min(bound) => {
                let (measure, noun) = measure(value)?;
                if measure < *bound {
                    return Err(format!("{noun} {measure} is less than minimum {bound}"));
                }
                Ok(())
            }
            Self::Max(bound) => {
                let (measure, noun) = measure(value)?;
                if measure > *bound {
                    return Err(format!("{noun} {measure} is greater than maximum {bound}"));
                }
                Ok(())
            }
            Self::Len(expected) => {
                let (measure, noun) = measure(value)?;
                if (measure - expected).abs() > f64::EPSILON {
                    return Err(format!("{noun} {measure} is not exactly {expected}"));
                }
                Ok(())
            }
            Self::OneOf(options) => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(_) | Value::Bool(_) => value.to_string(),
                    _ => return Err("cannot be compared against options".to_string()),
                };
                if options.iter().any(|option| *option == text) {
                    Ok(())
                } else {
                    Err(format!("'{text}' is not one of [{}]", options.join(", ")))
                }
            }
            Self::Url => {
                let text = value.as_str().ok_or("is not a string")?;
                Url::parse(text)
                    .map(|_| ())
                    .map_err(|e| format!("'{text}' is not a valid URL: {e}"))
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)] // lengths far below 2^52
fn measure(value: &Value) -> Result<(f64, &'static str), String> {
    match value {
        Value::String(s) => Ok((s.chars().count() as f64, "length")),
        Value::Array(items) => Ok((items.len() as f64, "length")),
        Value::Number(n) => n
            .as_f64()
            .map(|v| (v, "value"))
            .ok_or_else(|| "is not a representable number".to_string()),
        _ => Err("has no length or magnitude".to_string()),
    }
}

/// A parsed validation rule attached to a leaf field.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    source: String,
    required: bool,
    omit_empty: bool,
    constraints: Vec<Constraint>,
    element: Vec<Constraint>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Rule {
    /// Parses rule text for a field of the given kind.
    ///
    /// # Errors
    ///
    /// Returns the reason if the text contains an unknown constraint, a
    /// missing or malformed parameter, or a constraint that cannot apply
    /// to `kind`.
    pub fn parse(source: &str, kind: FieldKind) -> Result<Self, String> {
        let mut rule = Self {
            source: source.to_string(),
            required: false,
            omit_empty: false,
            constraints: Vec::new(),
            element: Vec::new(),
        };
        let mut diving = false;

        for token in source.split(',').map(str::trim) {
            if token.is_empty() {
                return Err("empty constraint".to_string());
            }
            let (name, param) = token
                .split_once('=')
                .map_or((token, None), |(name, param)| (name.trim(), Some(param.trim())));
            let target = if diving { FieldKind::String } else { kind };

            let constraint = match (name, param) {
                ("required", None) | ("omitempty", None) if diving => {
                    return Err(format!("'{name}' must precede 'dive'"));
                }
                ("required", None) => {
                    rule.required = true;
                    continue;
                }
                ("omitempty", None) => {
                    rule.omit_empty = true;
                    continue;
                }
                ("dive", None) => {
                    if diving || kind != FieldKind::StringList {
                        return Err("'dive' only applies once, to list fields".to_string());
                    }
                    diving = true;
                    continue;
                }
                ("url", None) => {
                    if target != FieldKind::String {
                        return Err(format!("'url' does not apply to {target} values"));
                    }
                    Constraint::Url
                }
                ("min" | "max" | "len", Some(param)) => {
                    if target == FieldKind::Boolean {
                        return Err(format!("'{name}' does not apply to boolean values"));
                    }
                    let bound = param
                        .parse::<f64>()
                        .ok()
                        .filter(|bound| bound.is_finite())
                        .ok_or_else(|| format!("'{name}' needs a numeric parameter, got '{param}'"))?;
                    match name {
                        "min" => Constraint::Min(bound),
                        "max" => Constraint::Max(bound),
                        _ => Constraint::Len(bound),
                    }
                }
                ("oneof", Some(param)) => {
                    let options: Vec<String> =
                        param.split_whitespace().map(str::to_string).collect();
                    if options.is_empty() {
                        return Err("'oneof' needs at least one option".to_string());
                    }
                    Constraint::OneOf(options)
                }
                ("required" | "omitempty" | "dive" | "url", Some(_)) => {
                    return Err(format!("'{name}' takes no parameter"));
                }
                ("min" | "max" | "len" | "oneof", None) => {
                    return Err(format!("'{name}' needs a parameter"));
                }
                (other, _) => return Err(format!("unknown constraint '{other}'")),
            };

            if diving {
                rule.element.push(constraint);
            } else {
                rule.constraints.push(constraint);
            }
        }

        Ok(rule)
    }

    /// Rule text as declared.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Checks a candidate value; `None` means the path is absent.
    ///
    /// # Errors
    ///
    /// Returns the reason of the first failing constraint.
    pub fn check(&self, value: Option<&Value>) -> Result<(), String> {
        let value = match value {
            None | Some(Value::Null) => {
                return if self.required {
                    Err("is required".to_string())
                } else {
                    Ok(())
                };
            }
            Some(value) => value,
        };

        if self.required && is_blank(value) {
            return Err("is required".to_string());
        }
        if self.omit_empty && is_zero(value) {
            return Ok(());
        }

        for constraint in &self.constraints {
            constraint.check(value)?;
        }

        if !self.element.is_empty() {
            let items = value.as_array().ok_or("is not a list")?;
            for (index, item) in items.iter().enumerate() {
                for constraint in &self.element {
                    constraint
                        .check(item)
                        .map_err(|reason| format!("element {index} {reason}"))?;
                }
            }
        }

        Ok(())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        other => is_blank(other),
    }
}
