//! Where a single-key read was answered from.

use std::fmt;

use serde::Serialize;

/// Source reported by [`ConfigService::get_value`](super::ConfigService::get_value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// An environment variable set the value.
    #[serde(rename = "env")]
    Environment,
    /// An active dynamic override.
    Dynamic,
    /// A configuration file.
    File,
    /// The code-embedded default.
    Default,
}

impl ValueSource {
    /// Short lowercase name: `env`, `dynamic`, `file` or `default`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::Dynamic => "dynamic",
            Self::File => "file",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
