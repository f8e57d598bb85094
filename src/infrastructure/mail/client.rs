//! HTTP client for the mail REST API (v1).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::{json, Value};

use crate::domain::errors::DomainResult;
use crate::domain::models::{HttpConfig, MailConfig};
use crate::domain::ports::{CredentialProvider, LabelChanges, MailClient, MailQuery, OutgoingMessage};
use crate::infrastructure::http::{ApiTransport, Query};

const SERVICE: &str = "mail";

/// reqwest implementation of [`MailClient`].
#[derive(Debug, Clone)]
pub struct HttpMailClient {
    transport: ApiTransport,
}

impl HttpMailClient {
    /// Client for the mail API at the configured `base_url`.
    pub fn new(
        config: &MailConfig,
        http: &HttpConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> DomainResult<Self> {
        Ok(Self {
            transport: ApiTransport::new(
                SERVICE,
                &config.base_url,
                http,
                credentials,
                HeaderMap::new(),
            )?,
        })
    }
}

fn list_query(request: MailQuery) -> Query {
    let mut query = vec![("maxResults", request.max_results.to_string())];
    if let Some(q) = request.query {
        query.push(("q", q));
    }
    if let Some(token) = request.page_token {
        query.push(("pageToken", token));
    }
    for label in request.label_ids {
        query.push(("labelIds", label));
    }
    if request.include_spam_trash {
        query.push(("includeSpamTrash", "true".to_string()));
    }
    query
}

/// `{"raw": .., "threadId": ..}`
fn message_body(message: OutgoingMessage) -> Value {
    let mut body = json!({ "raw": message.raw });
    if let Some(thread_id) = message.thread_id {
        body["threadId"] = json!(thread_id);
    }
    body
}

#[async_trait]
impl MailClient for HttpMailClient {
    async fn list_messages(&self, user_id: &str, query: MailQuery) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "messages"], list_query(query))
            .await
    }

    async fn get_message(
        &self,
        user_id: &str,
        message_id: &str,
        format: &str,
    ) -> DomainResult<Value> {
        self.transport
            .get(
                &["users", user_id, "messages", message_id],
                vec![("format", format.to_string())],
            )
            .await
    }

    async fn send_message(&self, user_id: &str, message: OutgoingMessage) -> DomainResult<Value> {
        self.transport
            .post(
                &["users", user_id, "messages", "send"],
                Some(&message_body(message)),
            )
            .await
    }

    async fn modify_message(
        &self,
        user_id: &str,
        message_id: &str,
        changes: LabelChanges,
    ) -> DomainResult<Value> {
        let body = json!({
            "addLabelIds": changes.add,
            "removeLabelIds": changes.remove,
        });
        self.transport
            .post(&["users", user_id, "messages", message_id, "modify"], Some(&body))
            .await
    }

    async fn trash_message(&self, user_id: &str, message_id: &str) -> DomainResult<Value> {
        self.transport
            .post(&["users", user_id, "messages", message_id, "trash"], None)
            .await
    }

    async fn untrash_message(&self, user_id: &str, message_id: &str) -> DomainResult<Value> {
        self.transport
            .post(&["users", user_id, "messages", message_id, "untrash"], None)
            .await
    }

    async fn delete_message(&self, user_id: &str, message_id: &str) -> DomainResult<()> {
        self.transport
            .delete(&["users", user_id, "messages", message_id])
            .await
            .map(|_| ())
    }

    async fn list_threads(&self, user_id: &str, query: MailQuery) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "threads"], list_query(query))
            .await
    }

    async fn get_thread(&self, user_id: &str, thread_id: &str) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "threads", thread_id], Vec::new())
            .await
    }

    async fn list_labels(&self, user_id: &str) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "labels"], Vec::new())
            .await
    }

    async fn get_label(&self, user_id: &str, label_id: &str) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "labels", label_id], Vec::new())
            .await
    }

    async fn create_label(&self, user_id: &str, label: Value) -> DomainResult<Value> {
        self.transport
            .post(&["users", user_id, "labels"], Some(&label))
            .await
    }

    async fn patch_label(
        &self,
        user_id: &str,
        label_id: &str,
        patch: Value,
    ) -> DomainResult<Value> {
        self.transport
            .patch(&["users", user_id, "labels", label_id], &patch)
            .await
    }

    async fn delete_label(&self, user_id: &str, label_id: &str) -> DomainResult<()> {
        self.transport
            .delete(&["users", user_id, "labels", label_id])
            .await
            .map(|_| ())
    }

    async fn list_drafts(&self, user_id: &str, query: MailQuery) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "drafts"], list_query(query))
            .await
    }

    async fn get_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<Value> {
        self.transport
            .get(&["users", user_id, "drafts", draft_id], Vec::new())
            .await
    }

    async fn create_draft(&self, user_id: &str, message: OutgoingMessage) -> DomainResult<Value> {
        let body = json!({ "message": message_body(message) });
        self.transport
            .post(&["users", user_id, "drafts"], Some(&body))
            .await
    }

    async fn update_draft(
        &self,
        user_id: &str,
        draft_id: &str,
        message: OutgoingMessage,
    ) -> DomainResult<Value> {
        let body = json!({ "id": draft_id, "message": message_body(message) });
        self.transport
            .put(&["users", user_id, "drafts", draft_id], &body)
            .await
    }

    async fn send_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<Value> {
        self.transport
            .post(
                &["users", user_id, "drafts", "send"],
                Some(&json!({ "id": draft_id })),
            )
            .await
    }

    async fn delete_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<()> {
        self.transport
            .delete(&["users", user_id, "drafts", draft_id])
            .await
            .map(|_| ())
    }
}
