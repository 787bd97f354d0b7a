//! Six-layer configuration resolution.
//!
//! [`Loader`] merges defaults, files, dynamic overrides and environment
//! variables into one tree, decodes it into a typed configuration and
//! validates it as a whole. The result is an immutable [`ConfigSnapshot`].

mod env;
mod error;
mod layout;
mod pipeline;
mod snapshot;


pub use env::{Environment, env_var_name};
pub use error::LoadError;
pub use layout::ConfigLayout;
pub use pipeline::Loader;
pub use snapshot::{ConfigSnapshot, FileLayer, Origin};
