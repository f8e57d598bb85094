//! Configuration loading: file layering, environment overrides and
//! validation.

use std::io::Write;

use tempfile::NamedTempFile;

use actionbridge::domain::models::{ConflictPolicy, DuplicateRolePolicy};
use actionbridge::infrastructure::setup::{self, build_dispatcher, SetupPaths};
use actionbridge::{Capability, ConfigError, ConfigLoader};

fn yaml_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_explicit_file_fills_every_section() {
    let file = yaml_file(
        r"
workspace:
  token: secret_from_file
  default_database_id: D1
  database_aliases:
    tasks: D-tasks
  auto_assign:
    properties: [DRI]
    duplicate_roles: forbid
calendar:
  token: ya29.calendar
  conflict_policy: block
mail:
  token: ya29.mail
  user_id: ops@example.com
http:
  timeout_secs: 5
",
    );

    let config = temp_env::with_vars_unset(
        ["ACTIONBRIDGE_WORKSPACE__TOKEN", "ACTIONBRIDGE_HTTP__TIMEOUT_SECS"],
        || ConfigLoader::load(Some(file.path())),
    )
    .unwrap();

    assert_eq!(config.workspace.token.as_deref(), Some("secret_from_file"));
    assert_eq!(config.workspace.default_database_id.as_deref(), Some("D1"));
    assert_eq!(
        config.workspace.database_aliases.get("tasks").map(String::as_str),
        Some("D-tasks")
    );
    assert_eq!(
        config.workspace.auto_assign.duplicate_roles,
        DuplicateRolePolicy::Forbid
    );
    assert_eq!(config.calendar.conflict_policy, ConflictPolicy::Block);
    assert_eq!(config.mail.user_id.as_deref(), Some("ops@example.com"));
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.http.requests_per_minute, 180);
}

#[test]
fn test_environment_overrides_file() {
    let file = yaml_file("workspace:\n  token: secret_from_file\nhttp:\n  timeout_secs: 5\n");

    let config = temp_env::with_vars(
        [
            ("ACTIONBRIDGE_WORKSPACE__TOKEN", Some("secret_from_env")),
            ("ACTIONBRIDGE_HTTP__TIMEOUT_SECS", Some("12")),
            ("ACTIONBRIDGE_CALENDAR__CONFLICT_POLICY", Some("ignore")),
        ],
        || ConfigLoader::load(Some(file.path())),
    )
    .unwrap();

    assert_eq!(config.workspace.token.as_deref(), Some("secret_from_env"));
    assert_eq!(config.http.timeout_secs, 12);
    assert_eq!(config.calendar.conflict_policy, ConflictPolicy::Ignore);
}

#[test]
fn test_no_token_anywhere_is_rejected() {
    let file = yaml_file("logging:\n  level: debug\n");

    let err = temp_env::with_vars_unset(
        [
            "ACTIONBRIDGE_WORKSPACE__TOKEN",
            "ACTIONBRIDGE_CALENDAR__TOKEN",
            "ACTIONBRIDGE_MAIL__TOKEN",
        ],
        || ConfigLoader::load(Some(file.path())),
    )
    .unwrap_err();

    assert!(err.to_string().contains("No service is configured"));
}

#[test]
fn test_invalid_enum_value_is_an_extraction_error() {
    let file = yaml_file("calendar:\n  token: ya29.x\n  conflict_policy: sometimes\n");

    let result = temp_env::with_vars_unset(["ACTIONBRIDGE_CALENDAR__CONFLICT_POLICY"], || {
        ConfigLoader::load(Some(file.path()))
    });

    assert!(result.is_err());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = temp_env::with_var("ACTIONBRIDGE_MAIL__TOKEN", Some("ya29.x"), || {
        ConfigLoader::load(Some(&path))
    })
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::MissingConfigFile(path.clone()))
    );
    assert!(err.to_string().contains("absent.yaml"));

    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Config file not found"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let file = yaml_file("mail:\n  token: ya29.x\nlogging:\n  level: chatty\n");

    let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid log level: chatty"));
}

#[test]
fn test_enabled_services_follow_tokens() {
    let file = yaml_file("calendar:\n  token: ya29.x\nmail:\n  token: \"  \"\n");

    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    let dispatcher = build_dispatcher(&config).unwrap();

    assert_eq!(dispatcher.capabilities(), vec![Capability::Calendar]);
}

#[test]
fn test_init_writes_loadable_template() {
    let dir = tempfile::tempdir().unwrap();
    let paths = SetupPaths::new(dir.path());

    assert!(setup::init(&paths, false).unwrap());
    assert!(paths.is_initialized());
    assert!(!setup::init(&paths, false).unwrap());

    let mut contents = std::fs::read_to_string(&paths.config_file).unwrap();
    contents.push_str("\n# enable one service for the load check\n");
    let file = yaml_file(&contents.replace("workspace:\n  token: null", "workspace:\n  token: secret_x"));
    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert!(config.workspace.is_enabled());
}
