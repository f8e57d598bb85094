//! HTTP client for the workspace REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Map, Value};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{HttpConfig, WorkspaceConfig};
use crate::domain::ports::{
    CreatePageRequest, CredentialProvider, PageRequest, QueryRequest, SearchRequest,
    WorkspaceClient,
};
use crate::infrastructure::http::{ApiTransport, Query};

const SERVICE: &str = "workspace";

/// reqwest implementation of [`WorkspaceClient`].
#[derive(Debug, Clone)]
pub struct HttpWorkspaceClient {
    transport: ApiTransport,
}

impl HttpWorkspaceClient {
    /// Client for the workspace API, sending the configured API version header.
    pub fn new(
        config: &WorkspaceConfig,
        http: &HttpConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> DomainResult<Self> {
        let mut headers = HeaderMap::new();
        let version = HeaderValue::from_str(&config.api_version).map_err(|e| {
            DomainError::Internal(format!("Invalid workspace api_version header: {e}"))
        })?;
        headers.insert("Notion-Version", version);

        Ok(Self {
            transport: ApiTransport::new(SERVICE, &config.base_url, http, credentials, headers)?,
        })
    }
}

/// Cursor fields for a POST body.
fn page_body(body: &mut Map<String, Value>, page: &PageRequest) {
    body.insert("page_size".to_string(), json!(page.page_size));
    if let Some(cursor) = &page.start_cursor {
        body.insert("start_cursor".to_string(), json!(cursor));
    }
}

/// Cursor fields for a GET query string.
fn page_query(page: &PageRequest) -> Query {
    let mut query = vec![("page_size", page.page_size.to_string())];
    if let Some(cursor) = &page.start_cursor {
        query.push(("start_cursor", cursor.clone()));
    }
    query
}

#[async_trait]
impl WorkspaceClient for HttpWorkspaceClient {
    async fn query_database(&self, request: QueryRequest) -> DomainResult<Value> {
        let mut body = Map::new();
        if let Some(filter) = request.filter {
            body.insert("filter".to_string(), filter);
        }
        if let Some(sorts) = request.sorts {
            body.insert("sorts".to_string(), Value::Array(sorts));
        }
        page_body(&mut body, &request.page);

        self.transport
            .post(
                &["databases", request.database_id.as_str(), "query"],
                Some(&Value::Object(body)),
            )
            .await
    }

    async fn retrieve_database(&self, database_id: &str) -> DomainResult<Value> {
        self.transport
            .get(&["databases", database_id], Vec::new())
            .await
    }

    async fn create_page(&self, request: CreatePageRequest) -> DomainResult<Value> {
        let mut body = json!({
            "parent": request.parent,
            "properties": request.properties,
        });
        if let Some(children) = request.children {
            body["children"] = Value::Array(children);
        }
        self.transport.post(&["pages"], Some(&body)).await
    }

    async fn retrieve_page(&self, page_id: &str) -> DomainResult<Value> {
        self.transport.get(&["pages", page_id], Vec::new()).await
    }

    async fn update_page(&self, page_id: &str, patch: Value) -> DomainResult<Value> {
        self.transport.patch(&["pages", page_id], &patch).await
    }

    async fn search(&self, request: SearchRequest) -> DomainResult<Value> {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(request.query));
        if let Some(filter_type) = request.filter_type {
            body.insert(
                "filter".to_string(),
                json!({ "property": "object", "value": filter_type }),
            );
        }
        page_body(&mut body, &request.page);

        self.transport
            .post(&["search"], Some(&Value::Object(body)))
            .await
    }

    async fn list_block_children(&self, block_id: &str, page: PageRequest) -> DomainResult<Value> {
        self.transport
            .get(&["blocks", block_id, "children"], page_query(&page))
            .await
    }

    async fn append_block_children(
        &self,
        block_id: &str,
        children: Vec<Value>,
    ) -> DomainResult<Value> {
        self.transport
            .patch(
                &["blocks", block_id, "children"],
                &json!({ "children": children }),
            )
            .await
    }

    async fn delete_block(&self, block_id: &str) -> DomainResult<Value> {
        self.transport.delete(&["blocks", block_id]).await
    }

    async fn list_users(&self, page: PageRequest) -> DomainResult<Value> {
        self.transport.get(&["users"], page_query(&page)).await
    }

    async fn retrieve_user(&self, user_id: &str) -> DomainResult<Value> {
        self.transport.get(&["users", user_id], Vec::new()).await
    }

    async fn create_comment(&self, page_id: &str, text: &str) -> DomainResult<Value> {
        let body = json!({
            "parent": { "page_id": page_id },
            "rich_text": [{ "text": { "content": text } }],
        });
        self.transport.post(&["comments"], Some(&body)).await
    }

    async fn list_comments(&self, block_id: &str, page: PageRequest) -> DomainResult<Value> {
        let mut query = page_query(&page);
        query.push(("block_id", block_id.to_string()));
        self.transport.get(&["comments"], query).await
    }
}
