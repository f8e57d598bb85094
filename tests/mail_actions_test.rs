//! Mail actions against the recording mock client.

mod common;

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{json, Value};

use actionbridge::domain::models::{CalendarConfig, MailConfig, WorkspaceConfig};
use actionbridge::domain::RemoteError;
use actionbridge::infrastructure::mock::MockServiceClient;
use actionbridge::DomainError;

use common::{dispatcher_with, full_dispatcher, mock};

fn decoded_raw(args: &Value) -> String {
    let raw = args["message"]["raw"].as_str().unwrap();
    String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap()
}

#[tokio::test]
async fn test_send_message_encodes_and_summarizes() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke(
            "mail",
            json!({
                "action": "send_message",
                "to": ["a@example.com", "b@example.com"],
                "subject": "Weekly sync",
                "body": "See you there",
                "thread_id": "thread-9"
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({
            "id": "msg-1",
            "url": null,
            "createdTime": null,
            "threadId": "thread-1",
            "labelIds": ["SENT"]
        })
    );

    let sent = client.last_args("send_message").unwrap();
    assert_eq!(sent["user_id"], "me");
    assert_eq!(sent["message"]["thread_id"], "thread-9");
    let text = decoded_raw(&sent);
    assert!(text.starts_with("To: a@example.com, b@example.com\r\nSubject: Weekly sync\r\n"));
    assert!(text.ends_with("\r\n\r\nSee you there"));
}

#[tokio::test]
async fn test_configured_user_id_is_used() {
    let client = mock();
    let config = MailConfig {
        user_id: Some("ops@example.com".to_string()),
        ..MailConfig::default()
    };
    let dispatcher = dispatcher_with(
        &client,
        WorkspaceConfig::default(),
        CalendarConfig::default(),
        config,
    );

    dispatcher
        .invoke("mail", json!({ "action": "list_labels" }))
        .await
        .unwrap();
    assert_eq!(client.last_args("list_labels").unwrap()["user_id"], "ops@example.com");
}

#[tokio::test]
async fn test_send_without_recipient_is_missing_parameter() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke("mail", json!({ "action": "send_message", "subject": "Hi" }))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parameter `to` is required for action `send_message`"
    );
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_raw_message_is_passed_through() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    dispatcher
        .invoke(
            "mail",
            json!({ "action": "create_draft", "raw": "VG86IGFAeC5jb20NCg0KQg" }),
        )
        .await
        .unwrap();
    assert_eq!(
        client.last_args("create_draft").unwrap()["message"]["raw"],
        "VG86IGFAeC5jb20NCg0KQg"
    );
}

#[tokio::test]
async fn test_list_messages_shape_and_defaults() {
    let client = Arc::new(MockServiceClient::new().with_response(
        "list_messages",
        json!({
            "messages": [{ "id": "m1", "threadId": "t1" }],
            "nextPageToken": "p2",
            "resultSizeEstimate": 42
        }),
    ));
    let dispatcher = full_dispatcher(&client);

    let result = dispatcher
        .invoke(
            "mail",
            json!({ "action": "list_messages", "query": "is:unread", "label_ids": "INBOX" }),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({
            "items": [{ "id": "m1", "threadId": "t1" }],
            "hasMore": true,
            "nextCursor": "p2",
            "total": 42
        })
    );
    let query = client.last_args("list_messages").unwrap()["query"].clone();
    assert_eq!(query["max_results"], 10);
    assert_eq!(query["label_ids"], json!(["INBOX"]));
    assert_eq!(query["query"], "is:unread");
}

#[tokio::test]
async fn test_get_message_validates_format() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    dispatcher
        .invoke("mail", json!({ "action": "get_message", "message_id": "m1" }))
        .await
        .unwrap();
    assert_eq!(client.last_args("get_message").unwrap()["format"], "full");

    let err = dispatcher
        .invoke(
            "mail",
            json!({ "action": "get_message", "message_id": "m1", "format": "html" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidParameter"));
    assert_eq!(client.calls_to("get_message").len(), 1);
}

#[tokio::test]
async fn test_modify_message_needs_label_changes() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke("mail", json!({ "action": "modify_message", "message_id": "m1" }))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidArguments"));

    let result = dispatcher
        .invoke(
            "mail",
            json!({
                "action": "modify_message",
                "message_id": "m1",
                "add_label_ids": ["STARRED"],
                "remove_label_ids": "UNREAD"
            }),
        )
        .await
        .unwrap();
    assert_eq!(result["labelIds"], json!(["STARRED"]));
    let call = client.last_args("modify_message").unwrap();
    assert_eq!(call["remove"], json!(["UNREAD"]));
}

#[tokio::test]
async fn test_trash_and_delete_confirmations() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    for action in ["trash_message", "delete_message"] {
        let result = dispatcher
            .invoke("mail", json!({ "action": action, "message_id": "m7" }))
            .await
            .unwrap();
        assert_eq!(result, json!({ "deleted": true, "id": "m7" }));
    }
}

#[tokio::test]
async fn test_label_lifecycle() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let created = dispatcher
        .invoke(
            "mail",
            json!({ "action": "create_label", "name": "Receipts", "label_list_visibility": "labelShow" }),
        )
        .await
        .unwrap();
    assert_eq!(created["id"], "Label_1");
    assert_eq!(created["name"], "Receipts");
    assert_eq!(
        client.last_args("create_label").unwrap()["label"],
        json!({ "name": "Receipts", "labelListVisibility": "labelShow" })
    );

    let err = dispatcher
        .invoke("mail", json!({ "action": "update_label", "label_id": "Label_1" }))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidArguments"));

    let deleted = dispatcher
        .invoke("mail", json!({ "action": "delete_label", "label_id": "Label_1" }))
        .await
        .unwrap();
    assert_eq!(deleted, json!({ "deleted": true, "id": "Label_1" }));
}

#[tokio::test]
async fn test_draft_update_and_send() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    let updated = dispatcher
        .invoke(
            "mail",
            json!({ "action": "update_draft", "draft_id": "draft-1", "body": "Revised" }),
        )
        .await
        .unwrap();
    assert_eq!(updated["id"], "draft-1");
    assert_eq!(updated["messageId"], "msg-2");

    let args = client.last_args("update_draft").unwrap();
    let raw = decoded_raw(&args);
    assert!(raw.starts_with("To: a@example.com\r\nSubject: Plan\r\n"));
    assert!(raw.ends_with("\r\n\r\nRevised"));
    assert_eq!(args["message"]["thread_id"], "thread-1");
    assert_eq!(client.calls_to("get_draft").len(), 1);

    let sent = dispatcher
        .invoke("mail", json!({ "action": "send_draft", "draft_id": "draft-1" }))
        .await
        .unwrap();
    assert_eq!(sent["id"], "msg-3");
    assert_eq!(sent["labelIds"], json!(["SENT"]));
}

#[tokio::test]
async fn test_remote_failure_is_not_retried() {
    let client = Arc::new(MockServiceClient::new().with_failure(
        "get_thread",
        RemoteError::new("mail", "Requested entity was not found.").with_status(404),
    ));
    let dispatcher = full_dispatcher(&client);

    let err = dispatcher
        .invoke("mail", json!({ "action": "get_thread", "thread_id": "t404" }))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Remote(ref remote) if remote.status == Some(404)));
    assert_eq!(client.calls_to("get_thread").len(), 1);
}

#[tokio::test]
async fn test_draft_update_keeps_unmentioned_fields() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    dispatcher
        .invoke(
            "mail",
            json!({ "action": "update_draft", "draft_id": "draft-1", "subject": "Plan v2", "cc": "c@example.com" }),
        )
        .await
        .unwrap();

    let raw = decoded_raw(&client.last_args("update_draft").unwrap());
    assert!(raw.contains("To: a@example.com\r\n"));
    assert!(raw.contains("Cc: c@example.com\r\n"));
    assert!(raw.contains("Subject: Plan v2\r\n"));
    assert!(raw.ends_with("\r\n\r\nOriginal"));
}

#[tokio::test]
async fn test_draft_update_with_raw_or_nothing_skips_lookup() {
    let client = mock();
    let dispatcher = full_dispatcher(&client);

    dispatcher
        .invoke(
            "mail",
            json!({ "action": "update_draft", "draft_id": "draft-1", "raw": "VG86IGFAeC5jb20" }),
        )
        .await
        .unwrap();
    assert_eq!(
        client.last_args("update_draft").unwrap()["message"]["raw"],
        "VG86IGFAeC5jb20"
    );

    let err = dispatcher
        .invoke("mail", json!({ "action": "update_draft", "draft_id": "draft-1" }))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("InvalidArguments"));
    assert!(client.calls_to("get_draft").is_empty());
}
