//! Action dispatcher.
//!
//! One entry point for every capability. An invocation is validated
//! against the declarative action table (capability, action, required
//! parameters), decoded into the typed action enum, and handed to the
//! capability's handler. Nothing reaches a client until all of that passed.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::errors::{DomainResult, ValidationError};
use crate::domain::models::action::is_blank;
use crate::domain::models::{ActionSpec, Capability};

use super::calendar_actions::CalendarActions;
use super::mail_actions::MailActions;
use super::workspace_actions::WorkspaceActions;

/// Routes validated invocations to the enabled capability handlers.
#[derive(Default)]
pub struct ActionDispatcher {
    workspace: Option<WorkspaceActions>,
    calendar: Option<CalendarActions>,
    mail: Option<MailActions>,
}

impl ActionDispatcher {
    /// A dispatcher with no capability enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the workspace capability.
    #[must_use]
    pub fn with_workspace(mut self, actions: WorkspaceActions) -> Self {
        self.workspace = Some(actions);
        self
    }

    /// Enables the calendar capability.
    #[must_use]
    pub fn with_calendar(mut self, actions: CalendarActions) -> Self {
        self.calendar = Some(actions);
        self
    }

    /// Enables the mail capability.
    #[must_use]
    pub fn with_mail(mut self, actions: MailActions) -> Self {
        self.mail = Some(actions);
        self
    }

    /// Workspace handler, when enabled. Tests use it to inspect the schema cache.
    pub const fn workspace(&self) -> Option<&WorkspaceActions> {
        self.workspace.as_ref()
    }

    /// Whether `capability` has a handler.
    pub const fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::Workspace => self.workspace.is_some(),
            Capability::Calendar => self.calendar.is_some(),
            Capability::Mail => self.mail.is_some(),
        }
    }

    /// Enabled capabilities, in table order.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// Descriptors (`name`, `description`, `inputSchema`) of the enabled
    /// capabilities.
    pub fn descriptors(&self) -> Vec<Value> {
        self.capabilities()
            .into_iter()
            .map(Capability::descriptor)
            .collect()
    }

    /// Validates and executes one invocation.
    pub async fn invoke(&self, name: &str, arguments: Value) -> DomainResult<Value> {
        let capability = Capability::parse(name)
            .ok_or_else(|| ValidationError::UnknownCapability(name.to_string()))?;
        if !self.is_enabled(capability) {
            return Err(ValidationError::CapabilityDisabled(name.to_string()).into());
        }

        let (spec, arguments) = Self::validate(capability, arguments)?;
        let started = Instant::now();
        let outcome = self.execute(capability, spec, arguments).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            Ok(_) => tracing::info!(
                capability = capability.name(),
                action = spec.name,
                outcome = "ok",
                elapsed_ms,
                "action completed"
            ),
            Err(err) => tracing::warn!(
                capability = capability.name(),
                action = spec.name,
                outcome = "error",
                kind = err.kind().as_str(),
                elapsed_ms,
                error = %err,
                "action failed"
            ),
        }
        outcome
    }

    /// Table lookups and required-parameter checks.
    fn validate(
        capability: Capability,
        arguments: Value,
    ) -> Result<(&'static ActionSpec, Map<String, Value>), ValidationError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(ValidationError::InvalidArguments {
                    action: capability.name().to_string(),
                    reason: "arguments must be an object".to_string(),
                })
            }
        };

        let action = match arguments.get("action") {
            Some(Value::String(action)) if !action.trim().is_empty() => action.trim(),
            Some(value) if !is_blank(value) => {
                return Err(ValidationError::InvalidParameter {
                    parameter: "action".to_string(),
                    action: capability.name().to_string(),
                    reason: "expected a string".to_string(),
                })
            }
            _ => {
                return Err(ValidationError::MissingAction {
                    capability: capability.name().to_string(),
                })
            }
        };

        let spec = capability
            .action(action)
            .ok_or_else(|| ValidationError::UnknownAction {
                action: action.to_string(),
                capability: capability.name().to_string(),
            })?;
        spec.check_required(&arguments)?;
        Ok((spec, arguments))
    }

    async fn execute(
        &self,
        capability: Capability,
        spec: &'static ActionSpec,
        mut arguments: Map<String, Value>,
    ) -> DomainResult<Value> {
        arguments.insert("action".to_string(), Value::String(spec.name.to_string()));
        let arguments = Value::Object(arguments);
        match capability {
            Capability::Workspace => match &self.workspace {
                Some(handler) => handler.execute(decode(spec, arguments)?).await,
                None => Err(ValidationError::CapabilityDisabled(capability.name().to_string()).into()),
            },
            Capability::Calendar => match &self.calendar {
                Some(handler) => handler.execute(decode(spec, arguments)?).await,
                None => Err(ValidationError::CapabilityDisabled(capability.name().to_string()).into()),
            },
            Capability::Mail => match &self.mail {
                Some(handler) => handler.execute(decode(spec, arguments)?).await,
                None => Err(ValidationError::CapabilityDisabled(capability.name().to_string()).into()),
            },
        }
    }
}

/// Decodes the argument bag into the typed action; type mismatches become
/// `InvalidArguments` for the action.
fn decode<T: DeserializeOwned>(spec: &ActionSpec, arguments: Value) -> Result<T, ValidationError> {
    serde_json::from_value(arguments).map_err(|err| ValidationError::InvalidArguments {
        action: spec.name.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::{CalendarConfig, WorkspaceConfig};
    use crate::infrastructure::mock::MockServiceClient;

    fn workspace_only(client: &Arc<MockServiceClient>) -> ActionDispatcher {
        ActionDispatcher::new().with_workspace(WorkspaceActions::new(
            client.clone(),
            WorkspaceConfig::default(),
        ))
    }

    fn validation(err: DomainError) -> ValidationError {
        match err {
            DomainError::Validation(err) => err,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_capabilities() {
        let client = Arc::new(MockServiceClient::new());
        let dispatcher = workspace_only(&client);

        let err = dispatcher.invoke("crm", json!({ "action": "x" })).await.unwrap_err();
        assert_eq!(validation(err).reason(), "UnknownCapability");

        let err = dispatcher
            .invoke("mail", json!({ "action": "list_labels" }))
            .await
            .unwrap_err();
        assert_eq!(validation(err).reason(), "CapabilityDisabled");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_names_action_and_capability() {
        let client = Arc::new(MockServiceClient::new());
        let err = workspace_only(&client)
            .invoke("workspace", json!({ "action": "frobnicate" }))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown action `frobnicate` for capability `workspace`"
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_action() {
        let client = Arc::new(MockServiceClient::new());
        let err = workspace_only(&client)
            .invoke("workspace", json!({ "page_id": "P1" }))
            .await
            .unwrap_err();
        assert_eq!(validation(err).reason(), "MissingAction");
    }

    #[tokio::test]
    async fn test_type_mismatch_is_invalid_arguments() {
        let client = Arc::new(MockServiceClient::new());
        let err = workspace_only(&client)
            .invoke("workspace", json!({ "action": "get_page", "page_id": 42 }))
            .await
            .unwrap_err();
        assert_eq!(validation(err).reason(), "InvalidArguments");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_descriptors_follow_enabled_set() {
        let client = Arc::new(MockServiceClient::new());
        let dispatcher = workspace_only(&client).with_calendar(CalendarActions::new(
            client.clone(),
            CalendarConfig::default(),
        ));
        let names: Vec<_> = dispatcher
            .descriptors()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["workspace", "calendar"]);
    }
}
