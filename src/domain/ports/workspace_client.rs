//! Workspace (database/document) service port.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::errors::DomainResult;

/// Cursor pagination for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

/// Database query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub database_id: String,
    pub filter: Option<Value>,
    pub sorts: Option<Vec<Value>>,
    pub page: PageRequest,
}

/// Page creation. `parent` is already resolved to a concrete parent object.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePageRequest {
    pub parent: Value,
    pub properties: Map<String, Value>,
    pub children: Option<Vec<Value>>,
}

/// Title search across pages and databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// `page` or `database`
    pub filter_type: Option<String>,
    pub page: PageRequest,
}

/// Port for the workspace service. One method per remote operation; every
/// method performs exactly one request and returns the raw remote object.
#[async_trait]
pub trait WorkspaceClient: Send + Sync {
    async fn query_database(&self, request: QueryRequest) -> DomainResult<Value>;

    /// Read-only; returns the database object including its property schema.
    async fn retrieve_database(&self, database_id: &str) -> DomainResult<Value>;

    async fn create_page(&self, request: CreatePageRequest) -> DomainResult<Value>;

    async fn retrieve_page(&self, page_id: &str) -> DomainResult<Value>;

    /// Sends only the supplied fields; the service leaves everything else untouched.
    async fn update_page(&self, page_id: &str, patch: Value) -> DomainResult<Value>;

    async fn search(&self, request: SearchRequest) -> DomainResult<Value>;

    async fn list_block_children(&self, block_id: &str, page: PageRequest) -> DomainResult<Value>;

    async fn append_block_children(
        &self,
        block_id: &str,
        children: Vec<Value>,
    ) -> DomainResult<Value>;

    async fn delete_block(&self, block_id: &str) -> DomainResult<Value>;

    async fn list_users(&self, page: PageRequest) -> DomainResult<Value>;

    async fn retrieve_user(&self, user_id: &str) -> DomainResult<Value>;

    async fn create_comment(&self, page_id: &str, text: &str) -> DomainResult<Value>;

    async fn list_comments(&self, block_id: &str, page: PageRequest) -> DomainResult<Value>;
}
