//! Service façade over the current configuration.
//!
//! [`ConfigService`] owns the published snapshot and the dynamic store and
//! is what request handlers talk to.

mod error;
mod facade;
mod source;


pub use error::ServiceError;
pub use facade::ConfigService;
pub use source::ValueSource;
