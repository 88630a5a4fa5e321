//! Configuration for the walk coordinator.
//!
//! Values come from an optional `walk.toml`, then environment variables
//! (optionally seeded from a `.env` file) override them. The loaded
//! [`Config`] is passed explicitly to the services; nothing reads globals
//! afterwards.
#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    AdminConfig, Config, ConfigMetadata, DatabaseConfig, NotificationConfig, RedisConfig,
    ScannerConfig, ServerConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
