//! Call-recording stub clients
//!
//! [`MockServiceClient`] implements all three service ports. Every call is
//! recorded with its arguments; responses default to small, realistic remote
//! objects and can be overridden or turned into failures per operation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::errors::{DomainResult, RemoteError};
use crate::domain::ports::{
    CalendarClient, CreatePageRequest, EventQuery, FreeBusyRequest, LabelChanges, MailClient,
    MailQuery, OutgoingMessage, PageRequest, QueryRequest, SearchRequest, WorkspaceClient,
};

const CREATED_TIME: &str = "2024-05-01T12:00:00.000Z";

/// One recorded port call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Port method name, e.g. `insert_event`.
    pub operation: &'static str,
    /// Arguments as JSON, flattened from the port call.
    pub args: Value,
}

/// Mock implementation of the workspace, calendar and mail ports.
#[derive(Debug, Default)]
pub struct MockServiceClient {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<HashMap<&'static str, Value>>,
    failures: Mutex<HashMap<&'static str, RemoteError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn empty_list() -> Value {
    json!({ "object": "list", "results": [], "has_more": false, "next_cursor": null })
}

fn page_args(page: &PageRequest) -> Value {
    json!({ "start_cursor": page.start_cursor, "page_size": page.page_size })
}

fn mail_query_args(query: &MailQuery) -> Value {
    json!({
        "query": query.query,
        "label_ids": query.label_ids,
        "max_results": query.max_results,
        "page_token": query.page_token,
        "include_spam_trash": query.include_spam_trash,
    })
}

fn message_args(message: &OutgoingMessage) -> Value {
    json!({ "raw": message.raw, "thread_id": message.thread_id })
}

impl MockServiceClient {
    /// Client answering every operation with its canned default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `response` from every call to `operation`.
    #[must_use]
    pub fn with_response(self, operation: &'static str, response: Value) -> Self {
        lock(&self.responses).insert(operation, response);
        self
    }

    /// Fail every call to `operation` with `error`.
    #[must_use]
    pub fn with_failure(self, operation: &'static str, error: RemoteError) -> Self {
        lock(&self.failures).insert(operation, error);
        self
    }

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Total number of calls.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Recorded calls of one operation.
    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    /// Arguments of the most recent call to `operation`.
    pub fn last_args(&self, operation: &str) -> Option<Value> {
        self.calls_to(operation).pop().map(|call| call.args)
    }

    fn record(
        &self,
        operation: &'static str,
        args: Value,
        default: impl FnOnce() -> Value,
    ) -> DomainResult<Value> {
        lock(&self.calls).push(RecordedCall { operation, args });
        if let Some(err) = lock(&self.failures).get(operation) {
            return Err(err.clone().into());
        }
        Ok(lock(&self.responses)
            .get(operation)
            .cloned()
            .unwrap_or_else(default))
    }

    fn record_unit(&self, operation: &'static str, args: Value) -> DomainResult<()> {
        self.record(operation, args, || Value::Null).map(|_| ())
    }
}

#[async_trait]
impl WorkspaceClient for MockServiceClient {
    async fn query_database(&self, request: QueryRequest) -> DomainResult<Value> {
        let args = json!({
            "database_id": request.database_id,
            "filter": request.filter,
            "sorts": request.sorts,
            "page": page_args(&request.page),
        });
        self.record("query_database", args, empty_list)
    }

    async fn retrieve_database(&self, database_id: &str) -> DomainResult<Value> {
        self.record("retrieve_database", json!({ "database_id": database_id }), || {
            json!({
                "object": "database",
                "id": database_id,
                "properties": {
                    "Name": { "id": "title", "type": "title", "title": {} }
                }
            })
        })
    }

    async fn create_page(&self, request: CreatePageRequest) -> DomainResult<Value> {
        let args = json!({
            "parent": request.parent,
            "properties": request.properties,
            "children": request.children,
        });
        self.record("create_page", args, || {
            json!({
                "object": "page",
                "id": "page-1",
                "url": "https://www.notion.so/page-1",
                "created_time": CREATED_TIME,
            })
        })
    }

    async fn retrieve_page(&self, page_id: &str) -> DomainResult<Value> {
        self.record("retrieve_page", json!({ "page_id": page_id }), || {
            json!({ "object": "page", "id": page_id, "properties": {} })
        })
    }

    async fn update_page(&self, page_id: &str, patch: Value) -> DomainResult<Value> {
        let args = json!({ "page_id": page_id, "patch": patch });
        self.record("update_page", args, || {
            json!({
                "object": "page",
                "id": page_id,
                "url": format!("https://www.notion.so/{page_id}"),
                "last_edited_time": CREATED_TIME,
                "archived": patch.get("archived").cloned().unwrap_or(Value::Bool(false)),
            })
        })
    }

    async fn search(&self, request: SearchRequest) -> DomainResult<Value> {
        let args = json!({
            "query": request.query,
            "filter_type": request.filter_type,
            "page": page_args(&request.page),
        });
        self.record("search", args, empty_list)
    }

    async fn list_block_children(&self, block_id: &str, page: PageRequest) -> DomainResult<Value> {
        let args = json!({ "block_id": block_id, "page": page_args(&page) });
        self.record("list_block_children", args, empty_list)
    }

    async fn append_block_children(
        &self,
        block_id: &str,
        children: Vec<Value>,
    ) -> DomainResult<Value> {
        let args = json!({ "block_id": block_id, "children": children });
        self.record("append_block_children", args, || {
            json!({ "object": "list", "results": children, "has_more": false, "next_cursor": null })
        })
    }

    async fn delete_block(&self, block_id: &str) -> DomainResult<Value> {
        self.record("delete_block", json!({ "block_id": block_id }), || {
            json!({ "object": "block", "id": block_id, "archived": true })
        })
    }

    async fn list_users(&self, page: PageRequest) -> DomainResult<Value> {
        self.record("list_users", json!({ "page": page_args(&page) }), empty_list)
    }

    async fn retrieve_user(&self, user_id: &str) -> DomainResult<Value> {
        self.record("retrieve_user", json!({ "user_id": user_id }), || {
            json!({ "object": "user", "id": user_id, "type": "person" })
        })
    }

    async fn create_comment(&self, page_id: &str, text: &str) -> DomainResult<Value> {
        let args = json!({ "page_id": page_id, "text": text });
        self.record("create_comment", args, || {
            json!({ "object": "comment", "id": "comment-1", "created_time": CREATED_TIME })
        })
    }

    async fn list_comments(&self, block_id: &str, page: PageRequest) -> DomainResult<Value> {
        let args = json!({ "block_id": block_id, "page": page_args(&page) });
        self.record("list_comments", args, empty_list)
    }
}

#[async_trait]
impl CalendarClient for MockServiceClient {
    async fn list_calendars(
        &self,
        max_results: u32,
        page_token: Option<String>,
    ) -> DomainResult<Value> {
        let args = json!({ "max_results": max_results, "page_token": page_token });
        self.record("list_calendars", args, || json!({ "items": [] }))
    }

    async fn list_events(&self, calendar_id: &str, query: EventQuery) -> DomainResult<Value> {
        let args = json!({
            "calendar_id": calendar_id,
            "time_min": query.time_min,
            "time_max": query.time_max,
            "query": query.query,
            "max_results": query.max_results,
            "page_token": query.page_token,
            "single_events": query.single_events,
            "order_by": query.order_by,
        });
        self.record("list_events", args, || json!({ "items": [] }))
    }

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> DomainResult<Value> {
        let args = json!({ "calendar_id": calendar_id, "event_id": event_id });
        self.record("get_event", args, || json!({ "id": event_id, "status": "confirmed" }))
    }

    async fn insert_event(&self, calendar_id: &str, event: Value) -> DomainResult<Value> {
        let args = json!({ "calendar_id": calendar_id, "event": event });
        self.record("insert_event", args, || {
            let mut created = event.clone();
            created["id"] = json!("event-1");
            created["htmlLink"] = json!("https://calendar.example.com/event?eid=event-1");
            created["created"] = json!(CREATED_TIME);
            created
        })
    }

    async fn quick_add(&self, calendar_id: &str, text: &str) -> DomainResult<Value> {
        let args = json!({ "calendar_id": calendar_id, "text": text });
        self.record("quick_add", args, || {
            json!({
                "id": "event-2",
                "summary": text,
                "htmlLink": "https://calendar.example.com/event?eid=event-2",
                "created": CREATED_TIME,
            })
        })
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: Value,
    ) -> DomainResult<Value> {
        let args = json!({ "calendar_id": calendar_id, "event_id": event_id, "patch": patch });
        self.record("patch_event", args, || {
            json!({
                "id": event_id,
                "htmlLink": format!("https://calendar.example.com/event?eid={event_id}"),
                "updated": CREATED_TIME,
            })
        })
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> DomainResult<()> {
        let args = json!({ "calendar_id": calendar_id, "event_id": event_id });
        self.record_unit("delete_event", args)
    }

    async fn free_busy(&self, request: FreeBusyRequest) -> DomainResult<Value> {
        let args = json!({
            "time_min": request.time_min,
            "time_max": request.time_max,
            "calendar_ids": request.calendar_ids,
            "time_zone": request.time_zone,
        });
        self.record("free_busy", args, || {
            let calendars: serde_json::Map<String, Value> = request
                .calendar_ids
                .iter()
                .map(|id| (id.clone(), json!({ "busy": [] })))
                .collect();
            json!({
                "kind": "calendar#freeBusy",
                "timeMin": request.time_min,
                "timeMax": request.time_max,
                "calendars": calendars,
            })
        })
    }
}

#[async_trait]
impl MailClient for MockServiceClient {
    async fn list_messages(&self, user_id: &str, query: MailQuery) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "query": mail_query_args(&query) });
        self.record("list_messages", args, || json!({ "resultSizeEstimate": 0 }))
    }

    async fn get_message(
        &self,
        user_id: &str,
        message_id: &str,
        format: &str,
    ) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "message_id": message_id, "format": format });
        self.record("get_message", args, || {
            json!({ "id": message_id, "threadId": "thread-1", "labelIds": ["INBOX"] })
        })
    }

    async fn send_message(&self, user_id: &str, message: OutgoingMessage) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "message": message_args(&message) });
        self.record("send_message", args, || {
            json!({ "id": "msg-1", "threadId": "thread-1", "labelIds": ["SENT"] })
        })
    }

    async fn modify_message(
        &self,
        user_id: &str,
        message_id: &str,
        changes: LabelChanges,
    ) -> DomainResult<Value> {
        let args = json!({
            "user_id": user_id,
            "message_id": message_id,
            "add": changes.add,
            "remove": changes.remove,
        });
        self.record("modify_message", args, || {
            json!({ "id": message_id, "threadId": "thread-1", "labelIds": changes.add })
        })
    }

    async fn trash_message(&self, user_id: &str, message_id: &str) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "message_id": message_id });
        self.record("trash_message", args, || {
            json!({ "id": message_id, "labelIds": ["TRASH"] })
        })
    }

    async fn untrash_message(&self, user_id: &str, message_id: &str) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "message_id": message_id });
        self.record("untrash_message", args, || {
            json!({ "id": message_id, "labelIds": ["INBOX"] })
        })
    }

    async fn delete_message(&self, user_id: &str, message_id: &str) -> DomainResult<()> {
        let args = json!({ "user_id": user_id, "message_id": message_id });
        self.record_unit("delete_message", args)
    }

    async fn list_threads(&self, user_id: &str, query: MailQuery) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "query": mail_query_args(&query) });
        self.record("list_threads", args, || json!({ "resultSizeEstimate": 0 }))
    }

    async fn get_thread(&self, user_id: &str, thread_id: &str) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "thread_id": thread_id });
        self.record("get_thread", args, || json!({ "id": thread_id, "messages": [] }))
    }

    async fn list_labels(&self, user_id: &str) -> DomainResult<Value> {
        self.record("list_labels", json!({ "user_id": user_id }), || {
            json!({ "labels": [{ "id": "INBOX", "name": "INBOX", "type": "system" }] })
        })
    }

    async fn get_label(&self, user_id: &str, label_id: &str) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "label_id": label_id });
        self.record("get_label", args, || json!({ "id": label_id, "name": label_id }))
    }

    async fn create_label(&self, user_id: &str, label: Value) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "label": label });
        self.record("create_label", args, || {
            json!({ "id": "Label_1", "name": label.get("name").cloned().unwrap_or(Value::Null) })
        })
    }

    async fn patch_label(
        &self,
        user_id: &str,
        label_id: &str,
        patch: Value,
    ) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "label_id": label_id, "patch": patch });
        self.record("patch_label", args, || json!({ "id": label_id }))
    }

    async fn delete_label(&self, user_id: &str, label_id: &str) -> DomainResult<()> {
        let args = json!({ "user_id": user_id, "label_id": label_id });
        self.record_unit("delete_label", args)
    }

    async fn list_drafts(&self, user_id: &str, query: MailQuery) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "query": mail_query_args(&query) });
        self.record("list_drafts", args, || json!({ "resultSizeEstimate": 0 }))
    }

    async fn get_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "draft_id": draft_id });
        self.record("get_draft", args, || {
            json!({
                "id": draft_id,
                "message": {
                    "id": "msg-1",
                    "threadId": "thread-1",
                    "payload": {
                        "mimeType": "text/plain",
                        "headers": [
                            { "name": "To", "value": "a@example.com" },
                            { "name": "Subject", "value": "Plan" }
                        ],
                        "body": { "data": "T3JpZ2luYWw" }
                    }
                }
            })
        })
    }

    async fn create_draft(&self, user_id: &str, message: OutgoingMessage) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "message": message_args(&message) });
        self.record("create_draft", args, || {
            json!({ "id": "draft-1", "message": { "id": "msg-1", "threadId": "thread-1" } })
        })
    }

    async fn update_draft(
        &self,
        user_id: &str,
        draft_id: &str,
        message: OutgoingMessage,
    ) -> DomainResult<Value> {
        let args = json!({
            "user_id": user_id,
            "draft_id": draft_id,
            "message": message_args(&message),
        });
        self.record("update_draft", args, || {
            json!({ "id": draft_id, "message": { "id": "msg-2", "threadId": "thread-1" } })
        })
    }

    async fn send_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<Value> {
        let args = json!({ "user_id": user_id, "draft_id": draft_id });
        self.record("send_draft", args, || {
            json!({ "id": "msg-3", "threadId": "thread-1", "labelIds": ["SENT"] })
        })
    }

    async fn delete_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<()> {
        let args = json!({ "user_id": user_id, "draft_id": draft_id });
        self.record_unit("delete_draft", args)
    }
}
