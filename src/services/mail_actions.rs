//! Mail capability: messages, threads, labels and drafts.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::domain::errors::{DomainResult, ValidationError};
use crate::domain::models::args::{list_or_empty, non_blank, StringList};
use crate::domain::models::mail::{
    ComposeArgs, CreateLabelArgs, DraftIdArgs, GetMessageArgs, LabelIdArgs, ListDraftsArgs,
    ListMessagesArgs, ListThreadsArgs, MessageIdArgs, ModifyMessageArgs, ThreadIdArgs,
    UpdateDraftArgs, UpdateLabelArgs, DEFAULT_MAX_MESSAGES, FALLBACK_USER_ID,
};
use crate::domain::models::{MailAction, MailConfig};
use crate::domain::ports::{LabelChanges, MailClient, MailQuery, OutgoingMessage};

use super::message_builder::MessageParts;
use super::resolver::IdentifierResolver;
use super::shaping::{self, field, ListPage};

const MESSAGE_FORMATS: &[&str] = &["full", "metadata", "minimal", "raw"];

static NO_ALIASES: BTreeMap<String, String> = BTreeMap::new();

fn invalid_arguments(action: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidArguments {
        action: action.to_string(),
        reason: reason.to_string(),
    }
}

/// Create summary for objects without a web URL, plus `extras` copied from
/// the raw response.
fn created_with(raw: &Value, extras: &[(&str, Value)]) -> Value {
    let mut summary = shaping::created(field(raw, "id"), Value::Null, Value::Null);
    for (key, value) in extras {
        summary.insert((*key).to_string(), value.clone());
    }
    Value::Object(summary)
}

fn updated_with(raw: &Value, extras: &[(&str, Value)]) -> Value {
    let mut summary = shaping::updated(field(raw, "id"), Value::Null, Value::Null);
    for (key, value) in extras {
        summary.insert((*key).to_string(), value.clone());
    }
    Value::Object(summary)
}

fn label_body(
    name: Option<String>,
    label_list_visibility: Option<String>,
    message_list_visibility: Option<String>,
) -> Map<String, Value> {
    let mut label = Map::new();
    if let Some(name) = name {
        label.insert("name".to_string(), json!(name));
    }
    if let Some(visibility) = label_list_visibility {
        label.insert("labelListVisibility".to_string(), json!(visibility));
    }
    if let Some(visibility) = message_list_visibility {
        label.insert("messageListVisibility".to_string(), json!(visibility));
    }
    label
}

/// Builds the encoded message for send/draft actions. A pre-encoded `raw`
/// wins over the structured fields.
fn compose(args: ComposeArgs, action: &str, require_recipient: bool) -> DomainResult<OutgoingMessage> {
    let thread_id = non_blank(args.thread_id.as_deref()).map(str::to_string);
    if let Some(raw) = non_blank(args.raw.as_deref()) {
        return Ok(OutgoingMessage {
            raw: raw.to_string(),
            thread_id,
        });
    }

    let to = list_or_empty(args.to);
    if require_recipient && to.is_empty() {
        return Err(ValidationError::missing("to", action).into());
    }
    if to.is_empty() && args.subject.is_none() && args.body.is_none() {
        return Err(invalid_arguments(action, "supply `raw` or message fields").into());
    }

    let parts = MessageParts {
        to,
        cc: list_or_empty(args.cc),
        bcc: list_or_empty(args.bcc),
        subject: args.subject,
        body: args.body,
        html: args.html,
        in_reply_to: args.in_reply_to,
    };
    Ok(OutgoingMessage {
        raw: parts.encode(),
        thread_id,
    })
}

/// Handlers for every mail action.
pub struct MailActions {
    client: Arc<dyn MailClient>,
    config: MailConfig,
}

impl MailActions {
    pub fn new(client: Arc<dyn MailClient>, config: MailConfig) -> Self {
        Self { client, config }
    }

    /// Configured mailbox owner, else `me`.
    fn user_id(&self) -> String {
        IdentifierResolver::new(&NO_ALIASES, self.config.user_id.as_deref())
            .with_fallback(FALLBACK_USER_ID)
            .resolve(None, None)
            .map_or_else(|| FALLBACK_USER_ID.to_string(), |resolved| resolved.id)
    }

    /// Replacement message for `update_draft`. Fields the caller left out
    /// are carried over from the stored draft; a pre-encoded `raw` replaces
    /// it outright.
    async fn merged_draft(
        &self,
        user: &str,
        draft_id: &str,
        args: ComposeArgs,
        action: &str,
    ) -> DomainResult<OutgoingMessage> {
        if non_blank(args.raw.as_deref()).is_some() {
            return compose(args, action, false);
        }
        let touched = args.to.is_some()
            || args.cc.is_some()
            || args.bcc.is_some()
            || args.subject.is_some()
            || args.body.is_some()
            || args.in_reply_to.is_some();
        if !touched {
            return Err(invalid_arguments(action, "supply `raw` or message fields").into());
        }

        let existing = self.client.get_draft(user, draft_id).await?;
        let message = field(&existing, "message");
        let stored = MessageParts::from_payload(&field(&message, "payload"));
        let html = if args.body.is_some() { args.html } else { stored.html || args.html };

        let parts = MessageParts {
            to: args.to.map_or(stored.to, StringList::into_vec),
            cc: args.cc.map_or(stored.cc, StringList::into_vec),
            bcc: args.bcc.map_or(stored.bcc, StringList::into_vec),
            subject: args.subject.or(stored.subject),
            body: args.body.or(stored.body),
            html,
            in_reply_to: args.in_reply_to.or(stored.in_reply_to),
        };
        let thread_id = non_blank(args.thread_id.as_deref())
            .or_else(|| message.get("threadId").and_then(Value::as_str))
            .map(str::to_string);
        Ok(OutgoingMessage {
            raw: parts.encode(),
            thread_id,
        })
    }

    /// Runs one validated mail action against the configured user id.
    pub async fn execute(&self, action: MailAction) -> DomainResult<Value> {
        let name = action.name();
        let user = self.user_id();
        let user = user.as_str();
        match action {
            MailAction::ListMessages(ListMessagesArgs {
                query,
                label_ids,
                max_results,
                page_token,
                include_spam_trash,
            }) => {
                let query = MailQuery {
                    query: query.filter(|q| !q.trim().is_empty()),
                    label_ids: list_or_empty(label_ids),
                    max_results: max_results.unwrap_or(DEFAULT_MAX_MESSAGES),
                    page_token,
                    include_spam_trash,
                };
                let raw = self.client.list_messages(user, query).await?;
                Ok(ListPage::from_google(raw, "messages").into_value())
            }
            MailAction::GetMessage(GetMessageArgs { message_id, format }) => {
                let format = non_blank(format.as_deref()).unwrap_or("full").to_ascii_lowercase();
                if !MESSAGE_FORMATS.contains(&format.as_str()) {
                    return Err(ValidationError::invalid(
                        "format",
                        name,
                        "expected `full`, `metadata`, `minimal` or `raw`",
                    )
                    .into());
                }
                self.client.get_message(user, &message_id, &format).await
            }
            MailAction::SendMessage(args) => {
                let message = compose(args, name, true)?;
                let raw = self.client.send_message(user, message).await?;
                Ok(created_with(
                    &raw,
                    &[("threadId", field(&raw, "threadId")), ("labelIds", field(&raw, "labelIds"))],
                ))
            }
            MailAction::ModifyMessage(ModifyMessageArgs {
                message_id,
                add_label_ids,
                remove_label_ids,
            }) => {
                let changes = LabelChanges {
                    add: list_or_empty(add_label_ids),
                    remove: list_or_empty(remove_label_ids),
                };
                if changes.add.is_empty() && changes.remove.is_empty() {
                    return Err(invalid_arguments(
                        name,
                        "supply `add_label_ids` or `remove_label_ids`",
                    )
                    .into());
                }
                let raw = self.client.modify_message(user, &message_id, changes).await?;
                Ok(updated_with(&raw, &[("labelIds", field(&raw, "labelIds"))]))
            }
            MailAction::TrashMessage(MessageIdArgs { message_id }) => {
                self.client.trash_message(user, &message_id).await?;
                Ok(shaping::deleted(&message_id))
            }
            MailAction::UntrashMessage(MessageIdArgs { message_id }) => {
                let raw = self.client.untrash_message(user, &message_id).await?;
                Ok(updated_with(&raw, &[("labelIds", field(&raw, "labelIds"))]))
            }
            MailAction::DeleteMessage(MessageIdArgs { message_id }) => {
                self.client.delete_message(user, &message_id).await?;
                Ok(shaping::deleted(&message_id))
            }
            MailAction::ListThreads(ListThreadsArgs {
                query,
                label_ids,
                max_results,
                page_token,
            }) => {
                let query = MailQuery {
                    query: query.filter(|q| !q.trim().is_empty()),
                    label_ids: list_or_empty(label_ids),
                    max_results: max_results.unwrap_or(DEFAULT_MAX_MESSAGES),
                    page_token,
                    include_spam_trash: false,
                };
                let raw = self.client.list_threads(user, query).await?;
                Ok(ListPage::from_google(raw, "threads").into_value())
            }
            MailAction::GetThread(ThreadIdArgs { thread_id }) => {
                self.client.get_thread(user, &thread_id).await
            }
            MailAction::ListLabels(_) => {
                let raw = self.client.list_labels(user).await?;
                Ok(ListPage::from_google(raw, "labels").into_value())
            }
            MailAction::GetLabel(LabelIdArgs { label_id }) => {
                self.client.get_label(user, &label_id).await
            }
            MailAction::CreateLabel(CreateLabelArgs {
                name: label_name,
                label_list_visibility,
                message_list_visibility,
            }) => {
                if label_name.trim().is_empty() {
                    return Err(ValidationError::missing("name", name).into());
                }
                let label = label_body(Some(label_name), label_list_visibility, message_list_visibility);
                let raw = self.client.create_label(user, Value::Object(label)).await?;
                Ok(created_with(&raw, &[("name", field(&raw, "name"))]))
            }
            MailAction::UpdateLabel(UpdateLabelArgs {
                label_id,
                name: label_name,
                label_list_visibility,
                message_list_visibility,
            }) => {
                let patch = label_body(label_name, label_list_visibility, message_list_visibility);
                if patch.is_empty() {
                    return Err(invalid_arguments(name, "no label fields to update").into());
                }
                let raw = self
                    .client
                    .patch_label(user, &label_id, Value::Object(patch))
                    .await?;
                Ok(updated_with(&raw, &[("name", field(&raw, "name"))]))
            }
            MailAction::DeleteLabel(LabelIdArgs { label_id }) => {
                self.client.delete_label(user, &label_id).await?;
                Ok(shaping::deleted(&label_id))
            }
            MailAction::ListDrafts(ListDraftsArgs {
                query,
                max_results,
                page_token,
            }) => {
                let query = MailQuery {
                    query: query.filter(|q| !q.trim().is_empty()),
                    label_ids: Vec::new(),
                    max_results: max_results.unwrap_or(DEFAULT_MAX_MESSAGES),
                    page_token,
                    include_spam_trash: false,
                };
                let raw = self.client.list_drafts(user, query).await?;
                Ok(ListPage::from_google(raw, "drafts").into_value())
            }
            MailAction::GetDraft(DraftIdArgs { draft_id }) => {
                self.client.get_draft(user, &draft_id).await
            }
            MailAction::CreateDraft(args) => {
                let message = compose(args, name, true)?;
                let raw = self.client.create_draft(user, message).await?;
                Ok(created_with(&raw, &draft_extras(&raw)))
            }
            MailAction::UpdateDraft(UpdateDraftArgs { draft_id, message }) => {
                let message = self.merged_draft(user, &draft_id, message, name).await?;
                let raw = self.client.update_draft(user, &draft_id, message).await?;
                Ok(updated_with(&raw, &draft_extras(&raw)))
            }
            MailAction::SendDraft(DraftIdArgs { draft_id }) => {
                let raw = self.client.send_draft(user, &draft_id).await?;
                Ok(created_with(
                    &raw,
                    &[("threadId", field(&raw, "threadId")), ("labelIds", field(&raw, "labelIds"))],
                ))
            }
            MailAction::DeleteDraft(DraftIdArgs { draft_id }) => {
                self.client.delete_draft(user, &draft_id).await?;
                Ok(shaping::deleted(&draft_id))
            }
        }
    }
}

fn draft_extras(raw: &Value) -> [(&'static str, Value); 2] {
    let message = field(raw, "message");
    [
        ("messageId", field(&message, "id")),
        ("threadId", field(&message, "threadId")),
    ]
}
