use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".actionbridge";

/// Prefix for environment overrides, e.g. `ACTIONBRIDGE_WORKSPACE__TOKEN`.
pub const ENV_PREFIX: &str = "ACTIONBRIDGE_";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "No service is configured. Set a token for at least one of: workspace, calendar, mail"
    )]
    NoServiceEnabled,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("{0}.base_url cannot be empty")]
    EmptyBaseUrl(&'static str),

    #[error("http.timeout_secs must be at least 1")]
    InvalidTimeout,

    #[error("http.requests_per_minute must be at least 1")]
    InvalidRateLimit,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Config file not found: {}", .0.display())]
    MissingConfigFile(PathBuf),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .actionbridge/config.yaml
    /// 3. .actionbridge/local.yaml
    /// 4. `explicit` file, when given
    /// 5. Environment variables (ACTIONBRIDGE_* prefix, `__` separates sections)
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            Self::require_file(path)?;
        }
        let config: Config = Self::figment(explicit)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without project files or
    /// environment overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        Self::require_file(path.as_ref())?;
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// A file the user named must exist; only the project files are optional.
    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(ConfigError::MissingConfigFile(path.to_path_buf()))
        }
    }

    /// The merged provider stack used by [`load`](Self::load).
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("config.yaml")))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("local.yaml")));
        if let Some(path) = explicit {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if config.http.requests_per_minute == 0 {
            return Err(ConfigError::InvalidRateLimit);
        }

        let base_urls = [
            ("workspace", &config.workspace.base_url),
            ("calendar", &config.calendar.base_url),
            ("mail", &config.mail.base_url),
        ];
        for (service, url) in base_urls {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyBaseUrl(service));
            }
        }

        if config.workspace.title_fallback_key.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "workspace.title_fallback_key cannot be empty".to_string(),
            ));
        }

        if !config.any_service_enabled() {
            return Err(ConfigError::NoServiceEnabled);
        }

        Ok(())
    }
}
