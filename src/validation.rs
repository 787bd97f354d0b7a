//! Rule violations and the error that carries them.

use std::fmt;

use thiserror::Error;

/// One field failing its validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dot-path of the failing field
    pub path: String,
    /// Rule text that failed
    pub rule: String,
    /// Why the value failed
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (rule '{}')", self.path, self.reason, self.rule)
    }
}

/// A candidate value, or a whole merged configuration, broke one or more
/// validation rules.
///
/// Whole-configuration validation reports every violation, not just the
/// first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Validation failed: {}", join(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Creates an error from a non-empty violation list.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Creates an error for a single field.
    #[must_use]
    pub fn single(path: impl Into<String>, rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(vec![Violation {
            path: path.into(),
            rule: rule.into(),
            reason: reason.into(),
        }])
    }

    /// All violations, in path order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if `path` is among the failing fields.
    #[must_use]
    pub fn involves(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}
