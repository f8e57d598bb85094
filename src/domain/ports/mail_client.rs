//! Mail service port.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainResult;

/// Listing parameters shared by messages, threads and drafts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailQuery {
    pub query: Option<String>,
    pub label_ids: Vec<String>,
    pub max_results: u32,
    pub page_token: Option<String>,
    pub include_spam_trash: bool,
}

/// An encoded message ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// base64url-encoded RFC 2822 message
    pub raw: String,
    pub thread_id: Option<String>,
}

/// Label changes for a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelChanges {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// Port for the mail service. Every method is scoped to a mailbox owner.
#[async_trait]
pub trait MailClient: Send + Sync {
    async fn list_messages(&self, user_id: &str, query: MailQuery) -> DomainResult<Value>;

    async fn get_message(&self, user_id: &str, message_id: &str, format: &str)
        -> DomainResult<Value>;

    async fn send_message(&self, user_id: &str, message: OutgoingMessage) -> DomainResult<Value>;

    async fn modify_message(
        &self,
        user_id: &str,
        message_id: &str,
        changes: LabelChanges,
    ) -> DomainResult<Value>;

    async fn trash_message(&self, user_id: &str, message_id: &str) -> DomainResult<Value>;

    async fn untrash_message(&self, user_id: &str, message_id: &str) -> DomainResult<Value>;

    async fn delete_message(&self, user_id: &str, message_id: &str) -> DomainResult<()>;

    async fn list_threads(&self, user_id: &str, query: MailQuery) -> DomainResult<Value>;

    async fn get_thread(&self, user_id: &str, thread_id: &str) -> DomainResult<Value>;

    async fn list_labels(&self, user_id: &str) -> DomainResult<Value>;

    async fn get_label(&self, user_id: &str, label_id: &str) -> DomainResult<Value>;

    async fn create_label(&self, user_id: &str, label: Value) -> DomainResult<Value>;

    async fn patch_label(&self, user_id: &str, label_id: &str, patch: Value)
        -> DomainResult<Value>;

    async fn delete_label(&self, user_id: &str, label_id: &str) -> DomainResult<()>;

    async fn list_drafts(&self, user_id: &str, query: MailQuery) -> DomainResult<Value>;

    async fn get_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<Value>;

    async fn create_draft(&self, user_id: &str, message: OutgoingMessage) -> DomainResult<Value>;

    async fn update_draft(
        &self,
        user_id: &str,
        draft_id: &str,
        message: OutgoingMessage,
    ) -> DomainResult<Value>;

    async fn send_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<Value>;

    async fn delete_draft(&self, user_id: &str, draft_id: &str) -> DomainResult<()>;
}
