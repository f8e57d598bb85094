//! Mail service actions.

use serde::Deserialize;

use super::action::{param, ActionSpec, ParamKind, ParamSpec};
use super::args::StringList;

/// Default result cap for message, thread and draft listings.
pub const DEFAULT_MAX_MESSAGES: u32 = 10;
/// Mailbox owner used when no user id is configured.
pub const FALLBACK_USER_ID: &str = "me";

const MESSAGE_ID: ParamSpec = param("message_id", ParamKind::String, "Message id");
const THREAD_ID: ParamSpec = param("thread_id", ParamKind::String, "Thread id");
const LABEL_ID: ParamSpec = param("label_id", ParamKind::String, "Label id");
const DRAFT_ID: ParamSpec = param("draft_id", ParamKind::String, "Draft id");
const QUERY: ParamSpec = param("query", ParamKind::String, "Search query (mailbox syntax)");
const LABEL_IDS: ParamSpec = param("label_ids", ParamKind::StringArray, "Label ids to filter by");
const MAX_RESULTS: ParamSpec = param("max_results", ParamKind::Integer, "Maximum results");
const PAGE_TOKEN: ParamSpec = param(
    "page_token",
    ParamKind::String,
    "Continuation token returned by a previous call",
);
const RAW: ParamSpec = param(
    "raw",
    ParamKind::String,
    "Pre-encoded RFC 2822 message (base64url); overrides the structured fields",
);
const TO: ParamSpec = param("to", ParamKind::StringArray, "Recipients");
const CC: ParamSpec = param("cc", ParamKind::StringArray, "Cc recipients");
const BCC: ParamSpec = param("bcc", ParamKind::StringArray, "Bcc recipients");
const SUBJECT: ParamSpec = param("subject", ParamKind::String, "Subject line");
const BODY: ParamSpec = param("body", ParamKind::String, "Message body");
const HTML: ParamSpec = param("html", ParamKind::Boolean, "Send the body as text/html");
const IN_REPLY_TO: ParamSpec = param(
    "in_reply_to",
    ParamKind::String,
    "Message-ID header of the message being answered",
);
const LABEL_LIST_VISIBILITY: ParamSpec = param(
    "label_list_visibility",
    ParamKind::String,
    "labelShow, labelShowIfUnread or labelHide",
);
const MESSAGE_LIST_VISIBILITY: ParamSpec =
    param("message_list_visibility", ParamKind::String, "show or hide");

/// Action table for the mail capability.
pub const MAIL_ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "list_messages",
        description: "List messages matching a query",
        required: &[],
        optional: &[
            QUERY,
            LABEL_IDS,
            MAX_RESULTS,
            PAGE_TOKEN,
            param(
                "include_spam_trash",
                ParamKind::Boolean,
                "Include spam and trash",
            ),
        ],
    },
    ActionSpec {
        name: "get_message",
        description: "Retrieve one message",
        required: &[MESSAGE_ID],
        optional: &[param(
            "format",
            ParamKind::String,
            "full, metadata, minimal or raw (default full)",
        )],
    },
    ActionSpec {
        name: "send_message",
        description: "Send a message from raw form or structured fields",
        required: &[],
        optional: &[RAW, TO, CC, BCC, SUBJECT, BODY, HTML, THREAD_ID, IN_REPLY_TO],
    },
    ActionSpec {
        name: "modify_message",
        description: "Add or remove labels on a message",
        required: &[MESSAGE_ID],
        optional: &[
            param("add_label_ids", ParamKind::StringArray, "Labels to add"),
            param("remove_label_ids", ParamKind::StringArray, "Labels to remove"),
        ],
    },
    ActionSpec {
        name: "trash_message",
        description: "Move a message to the trash",
        required: &[MESSAGE_ID],
        optional: &[],
    },
    ActionSpec {
        name: "untrash_message",
        description: "Restore a message from the trash",
        required: &[MESSAGE_ID],
        optional: &[],
    },
    ActionSpec {
        name: "delete_message",
        description: "Permanently delete a message",
        required: &[MESSAGE_ID],
        optional: &[],
    },
    ActionSpec {
        name: "list_threads",
        description: "List threads matching a query",
        required: &[],
        optional: &[QUERY, LABEL_IDS, MAX_RESULTS, PAGE_TOKEN],
    },
    ActionSpec {
        name: "get_thread",
        description: "Retrieve a thread with its messages",
        required: &[THREAD_ID],
        optional: &[],
    },
    ActionSpec {
        name: "list_labels",
        description: "List labels",
        required: &[],
        optional: &[],
    },
    ActionSpec {
        name: "get_label",
        description: "Retrieve one label",
        required: &[LABEL_ID],
        optional: &[],
    },
    ActionSpec {
        name: "create_label",
        description: "Create a label",
        required: &[param("name", ParamKind::String, "Label name")],
        optional: &[LABEL_LIST_VISIBILITY, MESSAGE_LIST_VISIBILITY],
    },
    ActionSpec {
        name: "update_label",
        description: "Update only the supplied label fields",
        required: &[LABEL_ID],
        optional: &[
            param("name", ParamKind::String, "Label name"),
            LABEL_LIST_VISIBILITY,
            MESSAGE_LIST_VISIBILITY,
        ],
    },
    ActionSpec {
        name: "delete_label",
        description: "Delete a label",
        required: &[LABEL_ID],
        optional: &[],
    },
    ActionSpec {
        name: "list_drafts",
        description: "List drafts",
        required: &[],
        optional: &[QUERY, MAX_RESULTS, PAGE_TOKEN],
    },
    ActionSpec {
        name: "get_draft",
        description: "Retrieve one draft",
        required: &[DRAFT_ID],
        optional: &[],
    },
    ActionSpec {
        name: "create_draft",
        description: "Create a draft from raw form or structured fields",
        required: &[],
        optional: &[RAW, TO, CC, BCC, SUBJECT, BODY, HTML, THREAD_ID, IN_REPLY_TO],
    },
    ActionSpec {
        name: "update_draft",
        description: "Replace a draft's message",
        required: &[DRAFT_ID],
        optional: &[RAW, TO, CC, BCC, SUBJECT, BODY, HTML, THREAD_ID, IN_REPLY_TO],
    },
    ActionSpec {
        name: "send_draft",
        description: "Send an existing draft",
        required: &[DRAFT_ID],
        optional: &[],
    },
    ActionSpec {
        name: "delete_draft",
        description: "Delete a draft",
        required: &[DRAFT_ID],
        optional: &[],
    },
];

/// Structured or raw message content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComposeArgs {
    pub raw: Option<String>,
    pub to: Option<StringList>,
    pub cc: Option<StringList>,
    pub bcc: Option<StringList>,
    pub subject: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub html: bool,
    pub thread_id: Option<String>,
    pub in_reply_to: Option<String>,
}

/// Arguments of `list_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListMessagesArgs {
    pub query: Option<String>,
    pub label_ids: Option<StringList>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    #[serde(default)]
    pub include_spam_trash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetMessageArgs {
    pub message_id: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageIdArgs {
    pub message_id: String,
}

/// Label changes for one message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModifyMessageArgs {
    pub message_id: String,
    pub add_label_ids: Option<StringList>,
    pub remove_label_ids: Option<StringList>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListThreadsArgs {
    pub query: Option<String>,
    pub label_ids: Option<StringList>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThreadIdArgs {
    pub thread_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmptyArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelIdArgs {
    pub label_id: String,
}

/// Arguments of `create_label`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateLabelArgs {
    pub name: String,
    pub label_list_visibility: Option<String>,
    pub message_list_visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateLabelArgs {
    pub label_id: String,
    pub name: Option<String>,
    pub label_list_visibility: Option<String>,
    pub message_list_visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListDraftsArgs {
    pub query: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftIdArgs {
    pub draft_id: String,
}

/// Arguments of `update_draft`. Fields left out keep their stored values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateDraftArgs {
    pub draft_id: String,
    #[serde(flatten)]
    pub message: ComposeArgs,
}

/// A validated mail invocation, one variant per action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MailAction {
    ListMessages(ListMessagesArgs),
    GetMessage(GetMessageArgs),
    SendMessage(ComposeArgs),
    ModifyMessage(ModifyMessageArgs),
    TrashMessage(MessageIdArgs),
    UntrashMessage(MessageIdArgs),
    DeleteMessage(MessageIdArgs),
    ListThreads(ListThreadsArgs),
    GetThread(ThreadIdArgs),
    ListLabels(EmptyArgs),
    GetLabel(LabelIdArgs),
    CreateLabel(CreateLabelArgs),
    UpdateLabel(UpdateLabelArgs),
    DeleteLabel(LabelIdArgs),
    ListDrafts(ListDraftsArgs),
    GetDraft(DraftIdArgs),
    CreateDraft(ComposeArgs),
    UpdateDraft(UpdateDraftArgs),
    SendDraft(DraftIdArgs),
    DeleteDraft(DraftIdArgs),
}

impl MailAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListMessages(_) => "list_messages",
            Self::GetMessage(_) => "get_message",
            Self::SendMessage(_) => "send_message",
            Self::ModifyMessage(_) => "modify_message",
            Self::TrashMessage(_) => "trash_message",
            Self::UntrashMessage(_) => "untrash_message",
            Self::DeleteMessage(_) => "delete_message",
            Self::ListThreads(_) => "list_threads",
            Self::GetThread(_) => "get_thread",
            Self::ListLabels(_) => "list_labels",
            Self::GetLabel(_) => "get_label",
            Self::CreateLabel(_) => "create_label",
            Self::UpdateLabel(_) => "update_label",
            Self::DeleteLabel(_) => "delete_label",
            Self::ListDrafts(_) => "list_drafts",
            Self::GetDraft(_) => "get_draft",
            Self::CreateDraft(_) => "create_draft",
            Self::UpdateDraft(_) => "update_draft",
            Self::SendDraft(_) => "send_draft",
            Self::DeleteDraft(_) => "delete_draft",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_send_message_structured_fields() {
        let action: MailAction = serde_json::from_value(json!({
            "action": "send_message",
            "to": "a@x.com",
            "subject": "S",
            "body": "B"
        }))
        .unwrap();
        match action {
            MailAction::SendMessage(args) => {
                assert!(args.raw.is_none());
                assert!(!args.html);
                assert_eq!(args.to.unwrap().into_vec(), vec!["a@x.com"]);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn test_list_labels_takes_no_arguments() {
        let action: MailAction =
            serde_json::from_value(json!({ "action": "list_labels" })).unwrap();
        assert_eq!(action, MailAction::ListLabels(EmptyArgs {}));
    }
}
