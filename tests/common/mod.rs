//! Common test utilities for integration tests
//!
//! Shared fixtures for building dispatchers over the recording mock client
//! and for generating sample arguments from the action tables.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Map, Value};

use actionbridge::domain::models::{
    ActionSpec, CalendarConfig, MailConfig, ParamKind, ParamSpec, WorkspaceConfig,
};
use actionbridge::infrastructure::mock::MockServiceClient;
use actionbridge::services::{ActionDispatcher, CalendarActions, MailActions, WorkspaceActions};

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn mock() -> Arc<MockServiceClient> {
    Arc::new(MockServiceClient::new())
}

/// Dispatcher with all three capabilities backed by `client`.
pub fn dispatcher_with(
    client: &Arc<MockServiceClient>,
    workspace: WorkspaceConfig,
    calendar: CalendarConfig,
    mail: MailConfig,
) -> ActionDispatcher {
    ActionDispatcher::new()
        .with_workspace(WorkspaceActions::new(client.clone(), workspace))
        .with_calendar(CalendarActions::new(client.clone(), calendar))
        .with_mail(MailActions::new(client.clone(), mail))
}

/// Dispatcher with default configuration for every capability.
pub fn full_dispatcher(client: &Arc<MockServiceClient>) -> ActionDispatcher {
    dispatcher_with(
        client,
        WorkspaceConfig::default(),
        CalendarConfig::default(),
        MailConfig::default(),
    )
}

/// A plausible value for a parameter.
pub fn sample_value(param: &ParamSpec) -> Value {
    match param.name {
        "start" | "time_min" => return json!("2024-05-01T09:00:00Z"),
        "end" | "time_max" => return json!("2024-05-01T10:00:00Z"),
        _ => {}
    }
    match param.kind {
        ParamKind::String => json!(format!("sample-{}", param.name)),
        ParamKind::Integer => json!(5),
        ParamKind::Boolean => json!(true),
        ParamKind::Object => json!({ "key": "value" }),
        ParamKind::Array => json!([{ "object": "block", "type": "paragraph", "paragraph": {} }]),
        ParamKind::StringArray => json!(["a@example.com"]),
        ParamKind::StringOrObject => json!("2024-05-01T09:00:00Z"),
    }
}

/// Arguments for `spec` holding only its required parameters.
pub fn required_args(spec: &ActionSpec) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("action".to_string(), json!(spec.name));
    for param in spec.required {
        args.insert(param.name.to_string(), sample_value(param));
    }
    args
}
