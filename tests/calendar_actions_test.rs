//! Calendar actions: resolution, conflict policies and duplicate detection.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use actionbridge::domain::models::{CalendarConfig, ConflictPolicy, MailConfig, WorkspaceConfig};
use actionbridge::domain::{RemoteError, ValidationError};
use actionbridge::infrastructure::mock::MockServiceClient;
use actionbridge::services::ActionDispatcher;
use actionbridge::DomainError;

use common::{dispatcher_with, full_dispatcher, mock};

fn calendar_dispatcher(client: &Arc<MockServiceClient>, config: CalendarConfig) -> ActionDispatcher {
    dispatcher_with(client, WorkspaceConfig::default(), config, MailConfig::default())
}

fn busy(calendar_id: &str, intervals: Value) -> Value {
    let mut calendars = serde_json::Map::new();
    calendars.insert(calendar_id.to_string(), json!({ "busy": intervals }));
    json!({ "kind": "calendar#freeBusy", "calendars": calendars })
}

fn standup(extra: Value) -> Value {
    let mut args = json!({
        "action": "create_event",
        "summary": "Standup",
        "start": "2024-05-01T09:00:00Z",
        "end": "2024-05-01T09:30:00Z"
    });
    if let (Some(args), Some(extra)) = (args.as_object_mut(), extra.as_object()) {
        args.extend(extra.clone());
    }
    args
}

#[tokio::test]
async fn test_calendar_resolution_falls_back_to_primary() {
    let client = mock();
    let config = CalendarConfig {
        aliases: BTreeMap::from([("team".to_string(), "team@group.calendar.google.com".to_string())]),
        ..CalendarConfig::default()
    };
    let dispatcher = calendar_dispatcher(&client, config);

    let cases = [
        (json!({ "calendar_id": "explicit@example.com", "calendar": "team" }), "explicit@example.com"),
        (json!({ "calendar": "TEAM" }), "team@group.calendar.google.com"),
        (json!({ "calendar": "nope" }), "primary"),
        (json!({}), "primary"),
    ];
    for (target, expected) in cases {
        let mut args = target.as_object().cloned().unwrap();
        args.insert("action".to_string(), json!("list_events"));
        dispatcher.invoke("calendar", Value::Object(args)).await.unwrap();
        assert_eq!(client.last_args("list_events").unwrap()["calendar_id"], expected);
    }
}

#[tokio::test]
async fn test_list_events_defaults() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke("calendar", json!({ "action": "list_events" }))
        .await
        .unwrap();

    assert_eq!(result, json!({ "items": [], "hasMore": false, "nextCursor": null }));
    let query = client.last_args("list_events").unwrap();
    assert_eq!(query["max_results"], 10);
    assert_eq!(query["single_events"], true);
    assert_eq!(query["order_by"], "startTime");
}

#[tokio::test]
async fn test_create_event_body_and_annotation() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke(
            "calendar",
            standup(json!({ "attendees": "a@example.com, b@example.com", "location": "Room 1" })),
        )
        .await
        .unwrap();

    let inserted = client.last_args("insert_event").unwrap();
    assert_eq!(inserted["calendar_id"], "primary");
    assert_eq!(
        inserted["event"],
        json!({
            "summary": "Standup",
            "start": { "dateTime": "2024-05-01T09:00:00Z" },
            "end": { "dateTime": "2024-05-01T09:30:00Z" },
            "location": "Room 1",
            "attendees": [{ "email": "a@example.com" }, { "email": "b@example.com" }]
        })
    );
    assert_eq!(result["id"], "event-1");
    assert_eq!(result["conflicts"], json!([]));

    let lookup = client.last_args("free_busy").unwrap();
    assert_eq!(lookup["time_min"], "2024-05-01T09:00:00Z");
    assert_eq!(lookup["time_max"], "2024-05-01T09:30:00Z");
    assert_eq!(lookup["calendar_ids"], json!(["primary"]));
}

#[tokio::test]
async fn test_annotate_reports_only_overlapping_intervals() {
    let client = Arc::new(MockServiceClient::new().with_response(
        "free_busy",
        busy(
            "primary",
            json!([
                { "start": "2024-05-01T08:30:00Z", "end": "2024-05-01T09:15:00Z" },
                { "start": "2024-05-01T09:30:00Z", "end": "2024-05-01T10:00:00Z" }
            ]),
        ),
    ));
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher.invoke("calendar", standup(json!({}))).await.unwrap();

    assert_eq!(
        result["conflicts"],
        json!([{ "start": "2024-05-01T08:30:00Z", "end": "2024-05-01T09:15:00Z" }])
    );
    assert_eq!(client.calls_to("insert_event").len(), 1);
}

#[tokio::test]
async fn test_block_policy_refuses_overlap() {
    let client = Arc::new(MockServiceClient::new().with_response(
        "free_busy",
        busy(
            "primary",
            json!([{ "start": "2024-05-01T09:10:00Z", "end": "2024-05-01T09:20:00Z" }]),
        ),
    ));
    let config = CalendarConfig {
        conflict_policy: ConflictPolicy::Block,
        ..CalendarConfig::default()
    };
    let dispatcher = calendar_dispatcher(&client, config);

    let err = dispatcher.invoke("calendar", standup(json!({}))).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::SchedulingConflict { conflicts: 1, .. })
    ));
    assert!(client.calls_to("insert_event").is_empty());
}

#[tokio::test]
async fn test_per_call_policy_overrides_config() {
    let client = Arc::new(MockServiceClient::new().with_response(
        "free_busy",
        busy(
            "primary",
            json!([{ "start": "2024-05-01T09:10:00Z", "end": "2024-05-01T09:20:00Z" }]),
        ),
    ));
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke("calendar", standup(json!({ "conflict_policy": "block" })))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("SchedulingConflict"));

    let result = dispatcher
        .invoke("calendar", standup(json!({ "conflict_policy": "ignore" })))
        .await
        .unwrap();
    assert!(result.get("conflicts").is_none());
    assert_eq!(client.calls_to("free_busy").len(), 1);

    let err = dispatcher
        .invoke("calendar", standup(json!({ "conflict_policy": "sometimes" })))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidParameter"));
}

#[tokio::test]
async fn test_lookup_failure_annotate_continues_block_fails() {
    let failing = || {
        Arc::new(MockServiceClient::new().with_failure(
            "free_busy",
            RemoteError::new("calendar", "Backend Error").with_status(503),
        ))
    };

    let client = failing();
    let result = full_dispatcher(&client)
        .invoke("calendar", standup(json!({})))
        .await
        .unwrap();
    assert_eq!(result["id"], "event-1");
    assert!(result.get("conflicts").is_none());

    let client = failing();
    let err = full_dispatcher(&client)
        .invoke("calendar", standup(json!({ "conflict_policy": "block" })))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Remote(_)));
    assert!(client.calls_to("insert_event").is_empty());
}

#[tokio::test]
async fn test_skip_duplicates_returns_existing_event() {
    let client = Arc::new(MockServiceClient::new().with_response(
        "list_events",
        json!({
            "items": [
                {
                    "id": "existing-1",
                    "summary": "Standup",
                    "htmlLink": "https://calendar.example.com/event?eid=existing-1",
                    "created": "2024-04-01T00:00:00Z",
                    "start": { "dateTime": "2024-05-01T11:00:00+02:00" }
                }
            ]
        }),
    ));
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke("calendar", standup(json!({ "skip_duplicates": true })))
        .await
        .unwrap();

    assert_eq!(result["id"], "existing-1");
    assert_eq!(result["duplicate"], true);
    assert!(client.calls_to("insert_event").is_empty());
    assert!(client.calls_to("free_busy").is_empty());
    assert_eq!(client.last_args("list_events").unwrap()["query"], "Standup");
}

#[tokio::test]
async fn test_skip_duplicates_inserts_when_start_differs() {
    let client = Arc::new(MockServiceClient::new().with_response(
        "list_events",
        json!({
            "items": [
                { "id": "other", "summary": "Standup", "start": { "dateTime": "2024-05-01T09:15:00Z" } }
            ]
        }),
    ));
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke("calendar", standup(json!({ "skip_duplicates": true })))
        .await
        .unwrap();

    assert_eq!(result["id"], "event-1");
    assert!(result.get("duplicate").is_none());
}

#[tokio::test]
async fn test_end_before_start_is_rejected() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke(
            "calendar",
            standup(json!({ "end": "2024-05-01T08:00:00Z" })),
        )
        .await
        .unwrap_err();
    match err {
        DomainError::Validation(ValidationError::InvalidParameter { parameter, .. }) => {
            assert_eq!(parameter, "end");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_local_time_with_zone_is_checked_for_conflicts() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    dispatcher
        .invoke(
            "calendar",
            standup(json!({
                "start": "2024-05-01T09:00:00",
                "end": "2024-05-01T09:30:00",
                "time_zone": "Europe/Berlin"
            })),
        )
        .await
        .unwrap();

    let lookup = client.last_args("free_busy").unwrap();
    assert_eq!(lookup["time_min"], "2024-05-01T07:00:00Z");
    assert_eq!(lookup["time_max"], "2024-05-01T07:30:00Z");
    let event = client.last_args("insert_event").unwrap()["event"].clone();
    assert_eq!(
        event["start"],
        json!({ "dateTime": "2024-05-01T09:00:00", "timeZone": "Europe/Berlin" })
    );
}

#[tokio::test]
async fn test_local_end_before_start_is_rejected_under_block() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke(
            "calendar",
            standup(json!({
                "start": "2024-05-01T10:00:00",
                "end": "2024-05-01T09:00:00",
                "time_zone": "Europe/Berlin",
                "conflict_policy": "block"
            })),
        )
        .await
        .unwrap_err();

    assert_eq!(err.reason(), Some("InvalidParameter"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_block_without_fixed_instants_is_refused() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);
    let floating = |time: &str| json!({ "dateTime": time });

    let err = dispatcher
        .invoke(
            "calendar",
            standup(json!({
                "start": floating("2024-05-01T10:00:00"),
                "end": floating("2024-05-01T09:00:00")
            })),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidParameter"));

    let err = dispatcher
        .invoke(
            "calendar",
            standup(json!({
                "start": floating("2024-05-01T09:00:00"),
                "end": floating("2024-05-01T10:00:00"),
                "conflict_policy": "block"
            })),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidArguments"));
    assert_eq!(client.call_count(), 0);

    dispatcher
        .invoke(
            "calendar",
            standup(json!({
                "start": floating("2024-05-01T09:00:00"),
                "end": floating("2024-05-01T10:00:00")
            })),
        )
        .await
        .unwrap();
    assert!(client.calls_to("free_busy").is_empty());
    assert_eq!(client.calls_to("insert_event").len(), 1);
}

#[tokio::test]
async fn test_unknown_time_zone_is_rejected() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke(
            "calendar",
            standup(json!({
                "start": "2024-05-01T09:00:00",
                "end": "2024-05-01T09:30:00",
                "time_zone": "Europe/Atlantis"
            })),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidParameter"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_all_day_event_needs_a_later_end_date() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke(
            "calendar",
            standup(json!({ "start": "2024-05-01", "end": "2024-05-01" })),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidParameter"));
    assert_eq!(client.call_count(), 0);

    dispatcher
        .invoke(
            "calendar",
            standup(json!({ "start": "2024-05-01", "end": "2024-05-02" })),
        )
        .await
        .unwrap();
    let event = client.last_args("insert_event").unwrap()["event"].clone();
    assert_eq!(event["start"], json!({ "date": "2024-05-01" }));
    assert_eq!(event["end"], json!({ "date": "2024-05-02" }));
}

#[tokio::test]
async fn test_zero_length_event_widens_duplicate_window() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    dispatcher
        .invoke(
            "calendar",
            standup(json!({ "end": "2024-05-01T09:00:00Z", "skip_duplicates": true })),
        )
        .await
        .unwrap();

    let query = client.last_args("list_events").unwrap();
    assert_eq!(query["time_min"], "2024-05-01T09:00:00Z");
    assert_eq!(query["time_max"], "2024-05-01T09:01:00Z");
    assert_eq!(client.calls_to("insert_event").len(), 1);
}

#[tokio::test]
async fn test_update_event_requires_a_field() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke("calendar", json!({ "action": "update_event", "event_id": "E1" }))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidArguments"));

    let result = dispatcher
        .invoke(
            "calendar",
            json!({ "action": "update_event", "event_id": "E1", "summary": "Renamed" }),
        )
        .await
        .unwrap();
    assert_eq!(result["updatedTime"], "2024-05-01T12:00:00.000Z");
    assert_eq!(
        client.last_args("patch_event").unwrap()["patch"],
        json!({ "summary": "Renamed" })
    );
}

#[tokio::test]
async fn test_delete_event_confirmation() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke("calendar", json!({ "action": "delete_event", "event_id": "E1" }))
        .await
        .unwrap();
    assert_eq!(result, json!({ "deleted": true, "id": "E1" }));
}

#[tokio::test]
async fn test_free_busy_resolves_aliases_and_shapes_result() {
    let client = mock();
    let config = CalendarConfig {
        aliases: BTreeMap::from([("team".to_string(), "team@group.calendar.google.com".to_string())]),
        ..CalendarConfig::default()
    };
    let dispatcher = calendar_dispatcher(&client, config);

    let result = dispatcher
        .invoke(
            "calendar",
            json!({
                "action": "get_freebusy",
                "time_min": "2024-05-01T00:00:00Z",
                "time_max": "2024-05-02T00:00:00Z",
                "calendar_ids": ["me@example.com"],
                "calendars": ["team", "me@example.com"]
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        client.last_args("free_busy").unwrap()["calendar_ids"],
        json!(["me@example.com", "team@group.calendar.google.com"])
    );
    assert_eq!(
        result,
        json!({
            "calendars": {
                "me@example.com": [],
                "team@group.calendar.google.com": []
            },
            "timeMin": "2024-05-01T00:00:00Z",
            "timeMax": "2024-05-02T00:00:00Z"
        })
    );
}

#[tokio::test]
async fn test_free_busy_rejects_unparseable_window() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke(
            "calendar",
            json!({ "action": "get_freebusy", "time_min": "tomorrow", "time_max": "2024-05-02T00:00:00Z" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidParameter"));
    assert_eq!(client.call_count(), 0);
}
