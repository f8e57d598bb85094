//! Workspace (database/document service) actions.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::action::{param, ActionSpec, ParamKind, ParamSpec};

/// Default result cap for generic queries.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default result cap when listing child content of a block.
pub const DEFAULT_CHILDREN_PAGE_SIZE: u32 = 50;
/// Largest page size the service accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

const DATABASE_ID: ParamSpec = param("database_id", ParamKind::String, "Database id");
const DATABASE: ParamSpec = param(
    "database",
    ParamKind::String,
    "Database alias from configuration (used when database_id is absent)",
);
const PAGE_ID: ParamSpec = param("page_id", ParamKind::String, "Page id");
const BLOCK_ID: ParamSpec = param("block_id", ParamKind::String, "Block or page id");
const START_CURSOR: ParamSpec = param(
    "start_cursor",
    ParamKind::String,
    "Continuation cursor returned by a previous call",
);
const PAGE_SIZE: ParamSpec = param("page_size", ParamKind::Integer, "Maximum results (1-100)");
const TITLE: ParamSpec = param(
    "title",
    ParamKind::String,
    "Convenience title, written into the container's title property",
);
const PROPERTIES: ParamSpec = param(
    "properties",
    ParamKind::Object,
    "Property values keyed by property name",
);
const CHILDREN: ParamSpec = param("children", ParamKind::Array, "Block objects");

/// Action table for the workspace capability.
pub const WORKSPACE_ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "query_database",
        description: "Query a database with optional filter and sorts",
        required: &[],
        optional: &[
            DATABASE_ID,
            DATABASE,
            param("filter", ParamKind::Object, "Filter object"),
            param("sorts", ParamKind::Array, "Sort objects"),
            START_CURSOR,
            PAGE_SIZE,
        ],
    },
    ActionSpec {
        name: "get_database",
        description: "Retrieve a database and its property schema",
        required: &[],
        optional: &[DATABASE_ID, DATABASE],
    },
    ActionSpec {
        name: "create_item",
        description: "Create a page inside a database",
        required: &[],
        optional: &[DATABASE_ID, DATABASE, TITLE, PROPERTIES, CHILDREN],
    },
    ActionSpec {
        name: "create_page",
        description: "Create a page under an explicit parent, a page or a database",
        required: &[],
        optional: &[
            param("parent", ParamKind::Object, "Explicit parent object"),
            PAGE_ID,
            DATABASE_ID,
            DATABASE,
            TITLE,
            PROPERTIES,
            CHILDREN,
        ],
    },
    ActionSpec {
        name: "get_page",
        description: "Retrieve a page",
        required: &[PAGE_ID],
        optional: &[],
    },
    ActionSpec {
        name: "update_page",
        description: "Update only the supplied page properties",
        required: &[PAGE_ID],
        optional: &[
            PROPERTIES,
            param("archived", ParamKind::Boolean, "Archive or restore the page"),
            param("icon", ParamKind::Object, "Icon object"),
        ],
    },
    ActionSpec {
        name: "archive_page",
        description: "Move a page to the trash",
        required: &[PAGE_ID],
        optional: &[],
    },
    ActionSpec {
        name: "search",
        description: "Search pages and databases by title",
        required: &[param("query", ParamKind::String, "Free-text query")],
        optional: &[
            param(
                "filter_type",
                ParamKind::String,
                "Restrict results to `page` or `database`",
            ),
            START_CURSOR,
            PAGE_SIZE,
        ],
    },
    ActionSpec {
        name: "get_block_children",
        description: "List the child blocks of a block or page",
        required: &[BLOCK_ID],
        optional: &[START_CURSOR, PAGE_SIZE],
    },
    ActionSpec {
        name: "append_blocks",
        description: "Append child blocks to a block or page",
        required: &[BLOCK_ID, CHILDREN],
        optional: &[],
    },
    ActionSpec {
        name: "delete_block",
        description: "Delete (archive) a block",
        required: &[BLOCK_ID],
        optional: &[],
    },
    ActionSpec {
        name: "list_users",
        description: "List workspace users",
        required: &[],
        optional: &[START_CURSOR, PAGE_SIZE],
    },
    ActionSpec {
        name: "get_user",
        description: "Retrieve a workspace user",
        required: &[param("user_id", ParamKind::String, "User id")],
        optional: &[],
    },
    ActionSpec {
        name: "add_comment",
        description: "Add a plain-text comment to a page",
        required: &[PAGE_ID, param("text", ParamKind::String, "Comment text")],
        optional: &[],
    },
    ActionSpec {
        name: "list_comments",
        description: "List comments on a block or page",
        required: &[BLOCK_ID],
        optional: &[START_CURSOR, PAGE_SIZE],
    },
];

/// Container reference shared by database-scoped actions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseRef {
    pub database_id: Option<String>,
    /// Alias resolved through configuration.
    pub database: Option<String>,
}

/// Cursor pagination shared by list actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub start_cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl Pagination {
    /// Effective page size, clamped to the service limit.
    pub fn size_or(&self, default: u32) -> u32 {
        self.page_size.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Arguments of `query_database`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryDatabaseArgs {
    #[serde(flatten)]
    pub target: DatabaseRef,
    pub filter: Option<Value>,
    pub sorts: Option<Vec<Value>>,
    #[serde(flatten)]
    pub page: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetDatabaseArgs {
    #[serde(flatten)]
    pub target: DatabaseRef,
}

/// Arguments of `create_item`: a page inside a database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateItemArgs {
    #[serde(flatten)]
    pub target: DatabaseRef,
    pub title: Option<String>,
    pub properties: Option<Map<String, Value>>,
    pub children: Option<Vec<Value>>,
}

/// Arguments of `create_page`, under a page or a database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatePageArgs {
    pub parent: Option<Value>,
    pub page_id: Option<String>,
    #[serde(flatten)]
    pub target: DatabaseRef,
    pub title: Option<String>,
    pub properties: Option<Map<String, Value>>,
    pub children: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageIdArgs {
    pub page_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdatePageArgs {
    pub page_id: String,
    pub properties: Option<Map<String, Value>>,
    pub archived: Option<bool>,
    pub icon: Option<Value>,
}

/// Arguments of `search`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    pub filter_type: Option<String>,
    #[serde(flatten)]
    pub page: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockListArgs {
    pub block_id: String,
    #[serde(flatten)]
    pub page: Pagination,
}

/// Arguments of `append_blocks`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppendBlocksArgs {
    pub block_id: String,
    pub children: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockIdArgs {
    pub block_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListUsersArgs {
    #[serde(flatten)]
    pub page: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserIdArgs {
    pub user_id: String,
}

/// Arguments of `add_comment`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddCommentArgs {
    pub page_id: String,
    pub text: String,
}

/// A validated workspace invocation, one variant per action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkspaceAction {
    QueryDatabase(QueryDatabaseArgs),
    GetDatabase(GetDatabaseArgs),
    CreateItem(CreateItemArgs),
    CreatePage(CreatePageArgs),
    GetPage(PageIdArgs),
    UpdatePage(UpdatePageArgs),
    ArchivePage(PageIdArgs),
    Search(SearchArgs),
    GetBlockChildren(BlockListArgs),
    AppendBlocks(AppendBlocksArgs),
    DeleteBlock(BlockIdArgs),
    ListUsers(ListUsersArgs),
    GetUser(UserIdArgs),
    AddComment(AddCommentArgs),
    ListComments(BlockListArgs),
}

impl WorkspaceAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::QueryDatabase(_) => "query_database",
            Self::GetDatabase(_) => "get_database",
            Self::CreateItem(_) => "create_item",
            Self::CreatePage(_) => "create_page",
            Self::GetPage(_) => "get_page",
            Self::UpdatePage(_) => "update_page",
            Self::ArchivePage(_) => "archive_page",
            Self::Search(_) => "search",
            Self::GetBlockChildren(_) => "get_block_children",
            Self::AppendBlocks(_) => "append_blocks",
            Self::DeleteBlock(_) => "delete_block",
            Self::ListUsers(_) => "list_users",
            Self::GetUser(_) => "get_user",
            Self::AddComment(_) => "add_comment",
            Self::ListComments(_) => "list_comments",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_item_deserializes_flattened_target() {
        let action: WorkspaceAction = serde_json::from_value(json!({
            "action": "create_item",
            "database_id": "D1",
            "title": "Fix bug",
            "properties": {}
        }))
        .unwrap();

        match action {
            WorkspaceAction::CreateItem(args) => {
                assert_eq!(args.target.database_id.as_deref(), Some("D1"));
                assert_eq!(args.title.as_deref(), Some("Fix bug"));
                assert!(args.properties.unwrap().is_empty());
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn test_pagination_defaults_and_clamps() {
        let page = Pagination::default();
        assert_eq!(page.size_or(DEFAULT_PAGE_SIZE), 10);
        assert_eq!(page.size_or(DEFAULT_CHILDREN_PAGE_SIZE), 50);

        let page = Pagination {
            start_cursor: None,
            page_size: Some(500),
        };
        assert_eq!(page.size_or(DEFAULT_PAGE_SIZE), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let action: WorkspaceAction = serde_json::from_value(json!({
            "action": "get_page",
            "page_id": "P1",
            "verbose": true
        }))
        .unwrap();
        assert_eq!(action.name(), "get_page");
    }
}
