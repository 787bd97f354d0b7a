//! Default values for the configuration layout.
//!
//! Centralized constants to avoid magic strings scattered across the codebase.

/// Base file merged as layer 2.
pub const BASE_FILE: &str = "default.toml";

/// Drop-in subdirectory merged as layer 4.
pub const DROP_IN_DIR: &str = "conf.d";

/// Extension of every declarative file the loader reads.
pub const FILE_EXTENSION: &str = "toml";

/// Configuration directory used when none is given.
pub const CONFIG_DIR: &str = "config";

/// File name of the JSON override store used by the CLI.
pub const STORE_FILE: &str = "dynamic.json";

/// Separator between nesting levels in a dot-path.
pub const PATH_SEPARATOR: char = '.';

/// Separator used in environment variable names.
pub const ENV_SEPARATOR: char = '_';
