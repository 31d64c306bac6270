//! Configuration for the tagstream collector.
//!
//! Everything is read once at startup from the process environment, after an
//! optional `.env` file has been applied. Composition from an [`EnvConfig`]
//! snapshot is pure, so callers and tests can inject values without touching
//! the real environment.

pub mod constants;
pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::{Config, ConfigMetadata, FeedCredentials, StoreConfig};
pub use sources::EnvConfig;
pub use validation::{ConfigWarning, ConfigWarnings};
