//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use strata::bootstrap::BootstrapError;
use strata::loader::LoadError;
use strata::service::ServiceError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::run::RunError;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid files, rejected key or value, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - store failure, failed rollback, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common errors.
pub fn print_error_hint(error: &RunError) {
    match error {
        RunError::Bootstrap(BootstrapError::Load(LoadError::Validation(_))) => {
            eprintln!("\nRun 'strata init' to generate a configuration template.");
        }
        RunError::Service(ServiceError::Forbidden { .. } | ServiceError::UnknownKey { .. }) => {
            eprintln!("\nRun 'strata keys' to list fields that accept dynamic overrides.");
        }
        RunError::Service(ServiceError::RollbackFailed { key, .. }) => {
            eprintln!("\nThe store still holds an unconfirmed value; run 'strata unset {key}'.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
