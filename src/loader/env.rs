//! Environment variable source (layer 6).

use std::collections::HashMap;
use std::env::VarError;

use crate::defaults::{ENV_SEPARATOR, PATH_SEPARATOR};

/// Where environment variables are read from.
///
/// Read on every load; nothing is cached between loads.
#[derive(Debug, Clone, Default)]
pub enum Environment {
    /// The process environment.
    #[default]
    Process,
    /// A fixed set of variables, for tests and embedding.
    Fixed(HashMap<String, String>),
}

impl Environment {
    /// Reads from the process environment.
    #[must_use]
    pub const fn process() -> Self {
        Self::Process
    }

    /// Reads from the given name/value pairs only.
    #[must_use]
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(
            vars.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Returns the variable's value, if set and valid UTF-8.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<String> {
        match self {
            Self::Process => match std::env::var(name) {
                Ok(value) => Some(value),
                Err(VarError::NotPresent) => None,
                Err(VarError::NotUnicode(_)) => {
                    tracing::warn!(var = name, "Ignoring non-UTF-8 environment variable");
                    None
                }
            },
            Self::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// Maps a dot-path to its environment variable name.
///
/// `app.name` becomes `APP_NAME`, or `STRATA_APP_NAME` with prefix `strata`.
#[must_use]
pub fn env_var_name(prefix: Option<&str>, path: &str) -> String {
    let body = path.replace(PATH_SEPARATOR, &ENV_SEPARATOR.to_string()).to_uppercase();
    match prefix.filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => format!("{}{ENV_SEPARATOR}{body}", prefix.to_uppercase()),
        None => body,
    }
}
