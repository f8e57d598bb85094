//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - defaults, project YAML files, an explicit file
//! - `ACTIONBRIDGE_` environment overrides
//! - validation before anything is served

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
