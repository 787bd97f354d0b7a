//! Command execution.
//!
//! Every command except `init` boots the full configuration, including the
//! dynamic store, so a broken configuration is reported before anything
//! is changed.

use serde_json::Value;
use thiserror::Error;

use strata::bootstrap::{Bootstrap, BootstrapError, write_default_config};
use strata::cli::{Cli, Command};
use strata::loader::{ConfigLayout, Environment, LoadError};
use strata::schema::builtin::{self, AppConfig};
use strata::service::{ConfigService, ServiceError};
use strata::store::FileStore;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Booting the configuration failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// A service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl RunError {
    /// Returns `true` if the failure is in the configuration or the request
    /// rather than in the environment the tool runs in.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        match self {
            Self::Bootstrap(BootstrapError::Load(LoadError::Provider(_))) => false,
            Self::Bootstrap(_) => true,
            Self::Service(err) => matches!(
                err,
                ServiceError::UnknownKey { .. }
                    | ServiceError::Forbidden { .. }
                    | ServiceError::Validation(_)
            ),
        }
    }
}

/// Builds the boot context for the CLI's directory and flags.
///
/// The bundled logger module is registered so its fields resolve too.
pub fn bootstrap(cli: &Cli, environment: Environment) -> Result<Bootstrap, BootstrapError> {
    let mut boot = Bootstrap::new(ConfigLayout::new(&cli.config_dir)).with_environment(environment);
    if let Some(prefix) = &cli.env_prefix {
        boot = boot.with_env_prefix(prefix.clone());
    }
    if let Some(timeout) = cli.store_timeout() {
        boot = boot.with_timeout(timeout);
    }
    boot.registry()
        .register(builtin::LOGGER_NAMESPACE, builtin::logger_schema())?;
    Ok(boot)
}

/// Executes the parsed command against the process environment.
pub async fn execute(cli: &Cli) -> Result<(), RunError> {
    execute_with(cli, Environment::process()).await
}

async fn execute_with(cli: &Cli, environment: Environment) -> Result<(), RunError> {
    if let Command::Init { output } = &cli.command {
        let path = write_default_config(output)?;
        println!("Configuration template written to: {}", path.display());
        return Ok(());
    }

    let boot = bootstrap(cli, environment)?;
    let service: ConfigService<AppConfig, FileStore> =
        boot.start(FileStore::new(cli.store_path())).await?;
    tracing::debug!(version = service.snapshot().version(), "Configuration loaded");

    match &cli.command {
        Command::Show => println!("{}", service.snapshot_json()?),
        Command::Get { key } => {
            let (value, source) = service.get_value(key)?;
            println!("{} ({source})", render(&value));
        }
        Command::Set { key, value } => {
            service.update_value(key, value).await?;
            println!("Set {key} (snapshot version {})", service.snapshot().version());
        }
        Command::Unset { key } => {
            service.delete_value(key).await?;
            println!("Unset {key} (snapshot version {})", service.snapshot().version());
        }
        Command::Keys => {
            for key in service.allowed_dynamic_keys() {
                println!("{key}");
            }
        }
        Command::Overrides => {
            for (key, value) in service.list_dynamic_overrides().await? {
                println!("{key} = {value}");
            }
        }
        Command::Init { .. } => {}
    }
    Ok(())
}

/// Strings print bare; everything else prints as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
