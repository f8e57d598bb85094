use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the action bridge.
///
/// Loaded once at startup and shared read-only for the life of the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Workspace (database/document) service
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Calendar service
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Mail service
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// True when at least one service has credentials.
    pub fn any_service_enabled(&self) -> bool {
        self.workspace.is_enabled() || self.calendar.is_enabled() || self.mail.is_enabled()
    }
}

/// Returns true when the token is present and not blank.
fn has_token(token: Option<&String>) -> bool {
    token.is_some_and(|t| !t.trim().is_empty())
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files. When unset, logs go to stderr.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for file output
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// HTTP client configuration shared by all service clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Token bucket capacity per service, refilled every minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_requests_per_minute() -> u32 {
    180
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

/// Whether one create call may put the acting user into more than one
/// people property.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateRolePolicy {
    /// Fill every eligible people property.
    #[default]
    Allow,
    /// Fill at most one property, and none if the acting user is already
    /// assigned somewhere in the bag.
    Forbid,
}

/// People-field auto-assignment settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AutoAssignConfig {
    /// People properties that may be filled even when the caller omitted them.
    /// Only applied when the database schema declares them as people-typed.
    #[serde(default)]
    pub properties: Vec<String>,

    #[serde(default)]
    pub duplicate_roles: DuplicateRolePolicy,
}

/// Workspace (database/document) service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkspaceConfig {
    /// Integration token. The capability is disabled when absent.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_workspace_base_url")]
    pub base_url: String,

    /// Value sent in the `Notion-Version` header
    #[serde(default = "default_workspace_api_version")]
    pub api_version: String,

    /// User id used for people-field auto-assignment
    #[serde(default)]
    pub acting_user_id: Option<String>,

    #[serde(default)]
    pub default_database_id: Option<String>,

    /// Short label -> database id
    #[serde(default)]
    pub database_aliases: BTreeMap<String, String>,

    /// Title property key used when schema discovery fails
    #[serde(default = "default_title_fallback_key")]
    pub title_fallback_key: String,

    #[serde(default)]
    pub auto_assign: AutoAssignConfig,
}

fn default_workspace_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_workspace_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_title_fallback_key() -> String {
    "Name".to_string()
}

impl WorkspaceConfig {
    pub fn is_enabled(&self) -> bool {
        has_token(self.token.as_ref())
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_workspace_base_url(),
            api_version: default_workspace_api_version(),
            acting_user_id: None,
            default_database_id: None,
            database_aliases: BTreeMap::new(),
            title_fallback_key: default_title_fallback_key(),
            auto_assign: AutoAssignConfig::default(),
        }
    }
}

/// What `create_event` does with overlapping busy intervals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// No free/busy lookup.
    Ignore,
    /// Look up overlaps and report them alongside the created event.
    #[default]
    Annotate,
    /// Refuse to create the event when overlaps exist.
    Block,
}

impl ConflictPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "annotate" => Some(Self::Annotate),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

/// Calendar service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarConfig {
    /// OAuth access token. The capability is disabled when absent.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_calendar_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub default_calendar_id: Option<String>,

    /// Short label -> calendar id
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

fn default_calendar_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

impl CalendarConfig {
    pub fn is_enabled(&self) -> bool {
        has_token(self.token.as_ref())
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_calendar_base_url(),
            default_calendar_id: None,
            aliases: BTreeMap::new(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

/// Mail service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MailConfig {
    /// OAuth access token. The capability is disabled when absent.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_mail_base_url")]
    pub base_url: String,

    /// Mailbox owner; `me` when unset
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_mail_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

impl MailConfig {
    pub fn is_enabled(&self) -> bool {
        has_token(self.token.as_ref())
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_mail_base_url(),
            user_id: None,
        }
    }
}
