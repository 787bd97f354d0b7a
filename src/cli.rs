//! CLI argument parsing using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::defaults;

/// Strata: layered service configuration
///
/// Resolves the configuration from defaults, files, dynamic overrides and
/// environment variables, and manages the dynamic overrides.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Configuration directory
    #[arg(long = "config-dir", short, global = true, default_value = defaults::CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Dynamic override store file [default: <config-dir>/dynamic.json]
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Prefix of recognized environment variables, e.g. `strata` for `STRATA_APP_NAME`
    #[arg(long = "env-prefix", global = true)]
    pub env_prefix: Option<String>,

    /// Timeout in seconds for each dynamic store call
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for strata
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the merged configuration as JSON
    Show,
    /// Print one value and where it came from
    Get {
        /// Dot-path of the field, e.g. `app.name`
        key: String,
    },
    /// Set a dynamic override
    Set {
        /// Dot-path of a dynamic field
        key: String,
        /// New value
        value: String,
    },
    /// Remove a dynamic override
    Unset {
        /// Dot-path of a dynamic field
        key: String,
    },
    /// List fields that accept dynamic overrides
    Keys,
    /// List stored dynamic overrides
    Overrides,
    /// Generate a configuration directory with a commented base file
    Init {
        /// Directory to create
        #[arg(long, short, default_value = defaults::CONFIG_DIR)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Path of the dynamic override store.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| self.config_dir.join(defaults::STORE_FILE))
    }

    /// Per-call store timeout.
    #[must_use]
    pub fn store_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
