//! Strata: layered service configuration
//!
//! Entry point for the strata command-line tool.

use std::process::ExitCode;

use strata::cli::Cli;

mod app;
mod run;

use app::{exit_code, print_error_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(&cli)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            print_error_hint(&e);
            if e.is_config_error() {
                exit_code::CONFIG_ERROR
            } else {
                exit_code::runtime_error()
            }
        }
    }
}
