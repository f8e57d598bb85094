//! Database schema discovery, cached per database for the process lifetime.
//!
//! Only successful lookups are cached; a failed lookup is retried on the next
//! create against the same database.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult, RemoteError};
use crate::domain::ports::WorkspaceClient;

/// The parts of a database schema that create operations need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSchema {
    /// Key of the single title-typed property.
    pub title_key: String,
    /// Keys of people-typed properties.
    pub people_keys: BTreeSet<String>,
}

impl DatabaseSchema {
    /// Read the property schema of a database object.
    ///
    /// Returns `None` when no title-typed property exists.
    pub fn from_database(database: &Value) -> Option<Self> {
        let properties = database.get("properties")?.as_object()?;

        let mut title_key = None;
        let mut people_keys = BTreeSet::new();
        for (key, property) in properties {
            match property.get("type").and_then(Value::as_str) {
                Some("title") if title_key.is_none() => title_key = Some(key.clone()),
                Some("people") => {
                    people_keys.insert(key.clone());
                }
                _ => {}
            }
        }

        Some(Self {
            title_key: title_key?,
            people_keys,
        })
    }
}

/// Append-only cache of database schemas keyed by database id.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<String, Arc<DatabaseSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema for `database_id` if it was loaded before, without fetching.
    pub async fn cached(&self, database_id: &str) -> Option<Arc<DatabaseSchema>> {
        self.entries.read().await.get(database_id).cloned()
    }

    /// Number of cached schemas.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Cached schema, or one read-only lookup through `client`.
    pub async fn get_or_fetch(
        &self,
        client: &dyn WorkspaceClient,
        database_id: &str,
    ) -> DomainResult<Arc<DatabaseSchema>> {
        if let Some(schema) = self.cached(database_id).await {
            return Ok(schema);
        }

        let database = client.retrieve_database(database_id).await?;
        let schema = DatabaseSchema::from_database(&database).ok_or_else(|| {
            DomainError::from(RemoteError::new(
                "workspace",
                format!("Database {database_id} has no title property"),
            ))
        })?;
        let schema = Arc::new(schema);

        // Concurrent lookups for the same id resolve identically; keep the first.
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(database_id.to_string())
            .or_insert_with(|| Arc::clone(&schema));
        tracing::debug!(database_id, title_key = %entry.title_key, "cached database schema");
        Ok(Arc::clone(entry))
    }
}
