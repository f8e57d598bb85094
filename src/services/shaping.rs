//! Result shapes shared by all capabilities.
//!
//! - list: `{"items", "hasMore", "nextCursor"}` plus `"total"` when known
//! - create: `{"id", "url", "createdTime"}` plus extras
//! - update: `{"id", "url", "updatedTime"}` plus extras
//! - delete: `{"deleted": true, "id"}`
//! - search item: `{"id", "type", "title", "url"}`

use serde_json::{json, Map, Value};

/// `raw[key]`, or `null`.
pub fn field(raw: &Value, key: &str) -> Value {
    raw.get(key).cloned().unwrap_or(Value::Null)
}

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub items: Vec<Value>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub total: Option<u64>,
}

fn take_items(raw: &mut Value, key: &str) -> Vec<Value> {
    match raw.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

impl ListPage {
    /// Workspace lists: `{"results", "has_more", "next_cursor"}`.
    pub fn from_workspace(mut raw: Value) -> Self {
        let items = take_items(&mut raw, "results");
        let next_cursor = raw
            .get("next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            items,
            has_more: raw
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(next_cursor.is_some()),
            next_cursor,
            total: None,
        }
    }

    /// Google lists: `{<items_key>, "nextPageToken", "resultSizeEstimate"}`.
    pub fn from_google(mut raw: Value, items_key: &str) -> Self {
        let items = take_items(&mut raw, items_key);
        let next_cursor = raw
            .get("nextPageToken")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            items,
            has_more: next_cursor.is_some(),
            next_cursor,
            total: raw.get("resultSizeEstimate").and_then(Value::as_u64),
        }
    }

    /// Reshapes each item in place.
    #[must_use]
    pub fn map_items(mut self, f: impl FnMut(Value) -> Value) -> Self {
        self.items = self.items.into_iter().map(f).collect();
        self
    }

    /// `{items, hasMore, nextCursor}` plus `total` when known.
    pub fn into_value(self) -> Value {
        let mut shaped = json!({
            "items": self.items,
            "hasMore": self.has_more,
            "nextCursor": self.next_cursor,
        });
        if let Some(total) = self.total {
            shaped["total"] = json!(total);
        }
        shaped
    }
}

/// Create summary; add action-specific extras to the returned map.
pub fn created(id: Value, url: Value, created_time: Value) -> Map<String, Value> {
    let mut summary = Map::new();
    summary.insert("id".to_string(), id);
    summary.insert("url".to_string(), url);
    summary.insert("createdTime".to_string(), created_time);
    summary
}

/// Update summary; add action-specific extras to the returned map.
pub fn updated(id: Value, url: Value, updated_time: Value) -> Map<String, Value> {
    let mut summary = Map::new();
    summary.insert("id".to_string(), id);
    summary.insert("url".to_string(), url);
    summary.insert("updatedTime".to_string(), updated_time);
    summary
}

/// Boolean confirmation returned by delete/trash actions.
pub fn deleted(id: &str) -> Value {
    json!({ "deleted": true, "id": id })
}

/// Uniform search hit: `{id, type, title, url}`.
pub fn search_item(id: Value, kind: &str, title: String, url: Value) -> Value {
    json!({ "id": id, "type": kind, "title": title, "url": url })
}
