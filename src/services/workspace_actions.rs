//! Workspace capability: database queries, page and block operations,
//! users and comments.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::domain::errors::{DomainResult, ValidationError};
use crate::domain::models::args::non_blank;
use crate::domain::models::workspace::{
    AddCommentArgs, AppendBlocksArgs, BlockIdArgs, BlockListArgs, CreateItemArgs, CreatePageArgs,
    DatabaseRef, Pagination, QueryDatabaseArgs, SearchArgs, UpdatePageArgs, DEFAULT_CHILDREN_PAGE_SIZE,
    DEFAULT_PAGE_SIZE,
};
use crate::domain::models::{WorkspaceAction, WorkspaceConfig};
use crate::domain::ports::{
    CreatePageRequest, PageRequest, QueryRequest, SearchRequest, WorkspaceClient,
};

use super::enrichment::{apply_title, PeopleEnrichment};
use super::resolver::IdentifierResolver;
use super::schema_cache::{DatabaseSchema, SchemaCache};
use super::shaping::{self, field, ListPage};

/// Title property key of pages whose parent is another page.
const PAGE_TITLE_KEY: &str = "title";

/// Concatenated plain text of a rich-text array.
fn plain_text(rich_text: &Value) -> String {
    rich_text
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| {
                    part.get("plain_text")
                        .or_else(|| part.get("text").and_then(|t| t.get("content")))
                        .and_then(Value::as_str)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Display title of a page or database object.
fn object_title(object: &Value) -> String {
    if let Some(title) = object.get("title") {
        return plain_text(title);
    }
    object
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|properties| {
            properties
                .values()
                .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        })
        .and_then(|p| p.get("title"))
        .map(plain_text)
        .unwrap_or_default()
}

fn page_request(page: Pagination, default_size: u32) -> PageRequest {
    PageRequest {
        page_size: page.size_or(default_size),
        start_cursor: page.start_cursor.filter(|c| !c.trim().is_empty()),
    }
}

fn create_summary(raw: &Value) -> Value {
    Value::Object(shaping::created(
        field(raw, "id"),
        field(raw, "url"),
        field(raw, "created_time"),
    ))
}

/// Where a new page goes, and which property holds its title.
enum PageParent {
    Database(String),
    Page(String),
    Other(Value),
}

impl PageParent {
    fn into_value(self) -> Value {
        match self {
            Self::Database(id) => json!({ "database_id": id }),
            Self::Page(id) => json!({ "page_id": id }),
            Self::Other(parent) => parent,
        }
    }
}

/// Handlers for every workspace action.
pub struct WorkspaceActions {
    client: Arc<dyn WorkspaceClient>,
    config: WorkspaceConfig,
    schemas: SchemaCache,
}

impl WorkspaceActions {
    /// Handler with an empty schema cache.
    pub fn new(client: Arc<dyn WorkspaceClient>, config: WorkspaceConfig) -> Self {
        Self {
            client,
            config,
            schemas: SchemaCache::new(),
        }
    }

    /// Cached database schemas, keyed by database id.
    pub const fn schema_cache(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Runs one validated workspace action.
    ///
    /// Create operations fill the title and people properties before the
    /// request is sent; see [`enrichment`](super::enrichment).
    pub async fn execute(&self, action: WorkspaceAction) -> DomainResult<Value> {
        let name = action.name();
        match action {
            WorkspaceAction::QueryDatabase(args) => self.query_database(args, name).await,
            WorkspaceAction::GetDatabase(args) => {
                let id = self.resolve_database(&args.target, name)?;
                self.client.retrieve_database(&id).await
            }
            WorkspaceAction::CreateItem(args) => self.create_item(args, name).await,
            WorkspaceAction::CreatePage(args) => self.create_page(args, name).await,
            WorkspaceAction::GetPage(args) => self.client.retrieve_page(&args.page_id).await,
            WorkspaceAction::UpdatePage(args) => self.update_page(args, name).await,
            WorkspaceAction::ArchivePage(args) => {
                self.client
                    .update_page(&args.page_id, json!({ "archived": true }))
                    .await?;
                Ok(shaping::deleted(&args.page_id))
            }
            WorkspaceAction::Search(args) => self.search(args, name).await,
            WorkspaceAction::GetBlockChildren(BlockListArgs { block_id, page }) => {
                let raw = self
                    .client
                    .list_block_children(&block_id, page_request(page, DEFAULT_CHILDREN_PAGE_SIZE))
                    .await?;
                Ok(ListPage::from_workspace(raw).into_value())
            }
            WorkspaceAction::AppendBlocks(AppendBlocksArgs { block_id, children }) => {
                let raw = self
                    .client
                    .append_block_children(&block_id, children)
                    .await?;
                Ok(ListPage::from_workspace(raw).into_value())
            }
            WorkspaceAction::DeleteBlock(BlockIdArgs { block_id }) => {
                self.client.delete_block(&block_id).await?;
                Ok(shaping::deleted(&block_id))
            }
            WorkspaceAction::ListUsers(args) => {
                let raw = self
                    .client
                    .list_users(page_request(args.page, DEFAULT_PAGE_SIZE))
                    .await?;
                Ok(ListPage::from_workspace(raw).into_value())
            }
            WorkspaceAction::GetUser(args) => self.client.retrieve_user(&args.user_id).await,
            WorkspaceAction::AddComment(AddCommentArgs { page_id, text }) => {
                let raw = self.client.create_comment(&page_id, &text).await?;
                Ok(create_summary(&raw))
            }
            WorkspaceAction::ListComments(BlockListArgs { block_id, page }) => {
                let raw = self
                    .client
                    .list_comments(&block_id, page_request(page, DEFAULT_PAGE_SIZE))
                    .await?;
                Ok(ListPage::from_workspace(raw).into_value())
            }
        }
    }

    /// `database_id` > alias > configured default. No literal fallback.
    fn resolve_database(&self, target: &DatabaseRef, action: &str) -> DomainResult<String> {
        IdentifierResolver::new(
            &self.config.database_aliases,
            self.config.default_database_id.as_deref(),
        )
        .resolve(target.database_id.as_deref(), target.database.as_deref())
        .map(|resolved| resolved.id)
        .ok_or_else(|| ValidationError::missing("database_id", action).into())
    }

    async fn query_database(&self, args: QueryDatabaseArgs, action: &str) -> DomainResult<Value> {
        let database_id = self.resolve_database(&args.target, action)?;
        let request = QueryRequest {
            database_id,
            filter: args.filter.filter(|f| !f.is_null()),
            sorts: args.sorts.filter(|s| !s.is_empty()),
            page: page_request(args.page, DEFAULT_PAGE_SIZE),
        };
        let raw = self.client.query_database(request).await?;
        Ok(ListPage::from_workspace(raw).into_value())
    }

    async fn create_item(&self, args: CreateItemArgs, action: &str) -> DomainResult<Value> {
        let database_id = self.resolve_database(&args.target, action)?;
        self.create(
            PageParent::Database(database_id),
            args.title.as_deref(),
            args.properties,
            args.children,
        )
        .await
    }

    async fn create_page(&self, args: CreatePageArgs, action: &str) -> DomainResult<Value> {
        let parent = match args.parent.filter(|p| !p.is_null()) {
            Some(Value::Object(parent)) if !parent.is_empty() => {
                match (
                    parent.get("database_id").and_then(Value::as_str),
                    parent.get("page_id").and_then(Value::as_str),
                ) {
                    (Some(id), _) => PageParent::Database(id.to_string()),
                    (None, Some(id)) => PageParent::Page(id.to_string()),
                    _ => PageParent::Other(Value::Object(parent)),
                }
            }
            Some(_) => {
                return Err(ValidationError::invalid(
                    "parent",
                    action,
                    "expected a non-empty object",
                )
                .into())
            }
            None => match non_blank(args.page_id.as_deref()) {
                Some(page_id) => PageParent::Page(page_id.to_string()),
                None => PageParent::Database(
                    self.resolve_database(&args.target, action)
                        .map_err(|_| ValidationError::missing("parent", action))?,
                ),
            },
        };

        self.create(parent, args.title.as_deref(), args.properties, args.children)
            .await
    }

    /// Title discovery, enrichment and the single create call.
    async fn create(
        &self,
        parent: PageParent,
        title: Option<&str>,
        properties: Option<Map<String, Value>>,
        children: Option<Vec<Value>>,
    ) -> DomainResult<Value> {
        let mut properties = properties.unwrap_or_default();
        let title = non_blank(title);
        let enrichment = PeopleEnrichment::new(
            self.config.acting_user_id.as_deref(),
            &self.config.auto_assign,
        );

        let schema = match &parent {
            PageParent::Database(id) if title.is_some() || enrichment.needs_schema() => {
                self.schema(id).await
            }
            _ => None,
        };

        if let Some(title) = title {
            let title_key = match (&parent, &schema) {
                (_, Some(schema)) => schema.title_key.as_str(),
                (PageParent::Page(_), None) => PAGE_TITLE_KEY,
                _ => self.config.title_fallback_key.as_str(),
            };
            apply_title(&mut properties, title_key, title);
        }

        enrichment.apply(
            &mut properties,
            schema.as_deref().map(|schema| &schema.people_keys),
        );

        let request = CreatePageRequest {
            parent: parent.into_value(),
            properties,
            children: children.filter(|c| !c.is_empty()),
        };
        let raw = self.client.create_page(request).await?;
        Ok(create_summary(&raw))
    }

    /// Schema for `database_id`; failures fall back to configured defaults.
    async fn schema(&self, database_id: &str) -> Option<Arc<DatabaseSchema>> {
        match self
            .schemas
            .get_or_fetch(self.client.as_ref(), database_id)
            .await
        {
            Ok(schema) => Some(schema),
            Err(err) => {
                tracing::warn!(
                    database_id,
                    error = %err,
                    fallback = %self.config.title_fallback_key,
                    "schema lookup failed, using fallback title key"
                );
                None
            }
        }
    }

    async fn update_page(&self, args: UpdatePageArgs, action: &str) -> DomainResult<Value> {
        let mut patch = Map::new();
        if let Some(properties) = args.properties.filter(|p| !p.is_empty()) {
            patch.insert("properties".to_string(), Value::Object(properties));
        }
        if let Some(archived) = args.archived {
            patch.insert("archived".to_string(), Value::Bool(archived));
        }
        if let Some(icon) = args.icon.filter(|i| !i.is_null()) {
            patch.insert("icon".to_string(), icon);
        }
        if patch.is_empty() {
            return Err(ValidationError::InvalidArguments {
                action: action.to_string(),
                reason: "supply at least one of `properties`, `archived` or `icon`".to_string(),
            }
            .into());
        }

        let raw = self
            .client
            .update_page(&args.page_id, Value::Object(patch))
            .await?;
        Ok(Value::Object(shaping::updated(
            field(&raw, "id"),
            field(&raw, "url"),
            field(&raw, "last_edited_time"),
        )))
    }

    async fn search(&self, args: SearchArgs, action: &str) -> DomainResult<Value> {
        let filter_type = match non_blank(args.filter_type.as_deref()) {
            Some(kind @ ("page" | "database")) => Some(kind.to_string()),
            Some(_) => {
                return Err(ValidationError::invalid(
                    "filter_type",
                    action,
                    "expected `page` or `database`",
                )
                .into())
            }
            None => None,
        };

        let request = SearchRequest {
            query: args.query,
            filter_type,
            page: page_request(args.page, DEFAULT_PAGE_SIZE),
        };
        let raw = self.client.search(request).await?;
        Ok(ListPage::from_workspace(raw)
            .map_items(|object| {
                let kind = object
                    .get("object")
                    .and_then(Value::as_str)
                    .unwrap_or("page")
                    .to_string();
                shaping::search_item(
                    field(&object, "id"),
                    &kind,
                    object_title(&object),
                    field(&object, "url"),
                )
            })
            .into_value())
    }
}
