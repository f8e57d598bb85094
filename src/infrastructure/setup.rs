//! Startup wiring and project initialization.
//!
//! - `build_dispatcher`: one HTTP client per enabled service
//! - `init`: scaffolds `.actionbridge/config.yaml`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::models::Config;
use crate::services::{ActionDispatcher, CalendarActions, MailActions, WorkspaceActions};

use super::calendar::HttpCalendarClient;
use super::config::loader::CONFIG_DIR;
use super::credentials::StaticCredential;
use super::mail::HttpMailClient;
use super::workspace::HttpWorkspaceClient;

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# actionbridge configuration
# Override settings by editing this file, adding .actionbridge/local.yaml,
# or setting environment variables with the ACTIONBRIDGE_ prefix
# (use __ between nested keys).
#
# Example environment variables:
#   export ACTIONBRIDGE_WORKSPACE__TOKEN=secret_xxx
#   export ACTIONBRIDGE_CALENDAR__CONFLICT_POLICY=block
#   export ACTIONBRIDGE_LOGGING__LEVEL=debug
#
# A capability is served only when its token is set.

logging:
  # trace, debug, info, warn, error
  level: "info"
  # json, pretty
  format: "json"
  # Write logs to rolling files in this directory instead of stderr
  log_dir: null
  # daily, hourly, never
  rotation: "daily"

http:
  timeout_secs: 30
  requests_per_minute: 180

workspace:
  token: null
  base_url: "https://api.notion.com/v1"
  api_version: "2022-06-28"
  # User placed into empty people properties on create
  acting_user_id: null
  default_database_id: null
  database_aliases: {}
  # Title property used when the database schema cannot be read
  title_fallback_key: "Name"
  auto_assign:
    # People properties filled even when absent from the request
    properties: []
    # allow, forbid
    duplicate_roles: "allow"

calendar:
  token: null
  base_url: "https://www.googleapis.com/calendar/v3"
  default_calendar_id: null
  aliases: {}
  # ignore, annotate, block
  conflict_policy: "annotate"

mail:
  token: null
  base_url: "https://gmail.googleapis.com/gmail/v1"
  user_id: null
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Paths under `root`.
    pub fn new(root: &Path) -> Self {
        let config_dir = root.join(CONFIG_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    /// Whether the project config file exists.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Writes the default configuration file. Returns `false` when a file
/// already exists and `force` is not set.
pub fn init(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.is_initialized() && !force {
        return Ok(false);
    }

    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "Failed to create config directory {}",
            paths.config_dir.display()
        )
    })?;
    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", paths.config_file.display()))?;

    tracing::info!(path = %paths.config_file.display(), "wrote default configuration");
    Ok(true)
}

/// Builds the dispatcher with a client for every enabled service.
pub fn build_dispatcher(config: &Config) -> Result<ActionDispatcher> {
    let mut dispatcher = ActionDispatcher::new();

    if config.workspace.is_enabled() {
        let credentials = Arc::new(StaticCredential::new(
            "workspace",
            config.workspace.token.clone(),
        ));
        let client = HttpWorkspaceClient::new(&config.workspace, &config.http, credentials)
            .context("Failed to build workspace client")?;
        dispatcher = dispatcher.with_workspace(WorkspaceActions::new(
            Arc::new(client),
            config.workspace.clone(),
        ));
    }

    if config.calendar.is_enabled() {
        let credentials = Arc::new(StaticCredential::new(
            "calendar",
            config.calendar.token.clone(),
        ));
        let client = HttpCalendarClient::new(&config.calendar, &config.http, credentials)
            .context("Failed to build calendar client")?;
        dispatcher = dispatcher.with_calendar(CalendarActions::new(
            Arc::new(client),
            config.calendar.clone(),
        ));
    }

    if config.mail.is_enabled() {
        let credentials = Arc::new(StaticCredential::new("mail", config.mail.token.clone()));
        let client = HttpMailClient::new(&config.mail, &config.http, credentials)
            .context("Failed to build mail client")?;
        dispatcher =
            dispatcher.with_mail(MailActions::new(Arc::new(client), config.mail.clone()));
    }

    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::models::{Capability, ConflictPolicy};

    #[test]
    fn test_template_parses_into_config() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.http.requests_per_minute, 180);
        assert_eq!(config.workspace.title_fallback_key, "Name");
        assert_eq!(config.calendar.conflict_policy, ConflictPolicy::Annotate);
        assert!(!config.any_service_enabled());
    }

    #[test]
    fn test_init_writes_once_unless_forced() {
        let dir = TempDir::new().unwrap();
        let paths = SetupPaths::new(dir.path());

        assert!(init(&paths, false).unwrap());
        fs::write(&paths.config_file, "logging: {}\n").unwrap();
        assert!(!init(&paths, false).unwrap());
        assert_eq!(fs::read_to_string(&paths.config_file).unwrap(), "logging: {}\n");

        assert!(init(&paths, true).unwrap());
        assert_eq!(
            fs::read_to_string(&paths.config_file).unwrap(),
            DEFAULT_CONFIG_TEMPLATE
        );
    }

    #[test]
    fn test_build_dispatcher_enables_configured_services() {
        let mut config = Config::default();
        config.calendar.token = Some("ya29.test".to_string());
        config.mail.token = Some("  ".to_string());

        let dispatcher = build_dispatcher(&config).unwrap();
        assert_eq!(dispatcher.capabilities(), vec![Capability::Calendar]);
    }
}
