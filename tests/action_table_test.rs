//! The action tables, typed requests and dispatcher must describe the same
//! set of actions.

mod common;

use serde_json::Value;

use actionbridge::domain::models::{CalendarAction, Capability, MailAction, WorkspaceAction};
use actionbridge::domain::ValidationError;
use actionbridge::DomainError;

use common::{full_dispatcher, mock, required_args};

fn decoded_name(capability: Capability, args: Value) -> Result<&'static str, serde_json::Error> {
    Ok(match capability {
        Capability::Workspace => serde_json::from_value::<WorkspaceAction>(args)?.name(),
        Capability::Calendar => serde_json::from_value::<CalendarAction>(args)?.name(),
        Capability::Mail => serde_json::from_value::<MailAction>(args)?.name(),
    })
}

#[test]
fn test_every_table_action_decodes_into_its_request_type() {
    for capability in Capability::ALL {
        for spec in capability.actions() {
            let args = Value::Object(required_args(spec));
            let name = decoded_name(capability, args).unwrap_or_else(|err| {
                panic!("{}.{} does not decode: {err}", capability.name(), spec.name)
            });
            assert_eq!(name, spec.name);
        }
    }
}

#[test]
fn test_unlisted_action_does_not_decode() {
    let args = serde_json::json!({ "action": "not_an_action" });
    for capability in Capability::ALL {
        assert!(decoded_name(capability, args.clone()).is_err());
    }
}

#[test]
fn test_table_sizes() {
    assert_eq!(Capability::Workspace.actions().len(), 15);
    assert_eq!(Capability::Calendar.actions().len(), 9);
    assert_eq!(Capability::Mail.actions().len(), 20);
}

#[tokio::test]
async fn test_every_required_parameter_is_enforced_before_any_call() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    for capability in Capability::ALL {
        for spec in capability.actions() {
            for missing in spec.required {
                let mut args = required_args(spec);
                args.remove(missing.name);

                let err = dispatcher
                    .invoke(capability.name(), Value::Object(args))
                    .await
                    .expect_err("missing parameter must fail");
                match err {
                    DomainError::Validation(ValidationError::MissingParameter {
                        parameter,
                        action,
                    }) => {
                        assert_eq!(parameter, missing.name);
                        assert_eq!(action, spec.name);
                    }
                    other => panic!(
                        "{}.{} without {}: unexpected {other:?}",
                        capability.name(),
                        spec.name,
                        missing.name
                    ),
                }
            }
        }
    }

    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_action_reaches_no_client() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    for capability in Capability::ALL {
        let err = dispatcher
            .invoke(capability.name(), serde_json::json!({ "action": "explode" }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::UnknownAction { .. })
        ));
    }
    assert_eq!(client.call_count(), 0);
}
