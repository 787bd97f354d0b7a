//! Strata: layered service configuration
//!
//! Resolves one validated, typed configuration from six ordered layers
//! (defaults, base file, domain files, drop-in files, dynamic overrides,
//! environment) and lets operators change a restricted set of fields at
//! runtime without ever publishing an invalid configuration.
//!
//! ```no_run
//! use strata::bootstrap::Bootstrap;
//! use strata::loader::ConfigLayout;
//! use strata::schema::builtin::{self, AppConfig};
//! use strata::store::FileStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let boot = Bootstrap::new(ConfigLayout::new("config"));
//! boot.registry()
//!     .register(builtin::LOGGER_NAMESPACE, builtin::logger_schema())?;
//!
//! let service = boot
//!     .start::<AppConfig, _>(FileStore::new("config/dynamic.json"))
//!     .await?;
//! service.update_value("app.name", "renamed").await?;
//! let (value, source) = service.get_value("app.name")?;
//! println!("{value} ({source})");
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod cli;
pub mod defaults;
pub mod loader;
pub mod metadata;
pub mod schema;
pub mod service;
pub mod store;
pub mod tree;
pub mod validation;

#[cfg(test)]
mod cli_tests;
#[cfg(test)]
mod tree_tests;
