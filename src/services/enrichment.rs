//! Gap-filling rules for outgoing workspace property bags.
//!
//! Nothing here overwrites a value the caller supplied: people fields are
//! only filled when they are present-and-empty (or whitelisted and absent),
//! and the title is only written when the title property carries no text.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::domain::models::action::is_blank;
use crate::domain::models::{AutoAssignConfig, DuplicateRolePolicy};

/// Property value for a title written from a plain string.
pub fn title_value(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

fn segment_has_text(segment: &Value) -> bool {
    match segment
        .pointer("/text/content")
        .or_else(|| segment.get("plain_text"))
        .and_then(Value::as_str)
    {
        Some(text) => !text.trim().is_empty(),
        None => !is_blank(segment),
    }
}

/// Whether a title property value carries any text. `{"title": []}` and
/// titles made only of blank segments do not.
pub fn has_title_text(value: &Value) -> bool {
    match value.get("title") {
        Some(Value::Array(segments)) => segments.iter().any(segment_has_text),
        Some(other) => !is_blank(other),
        None => !is_blank(value),
    }
}

/// Writes `title` under `title_key` unless the caller already gave that
/// property some text. Returns whether the bag changed.
pub fn apply_title(properties: &mut Map<String, Value>, title_key: &str, title: &str) -> bool {
    if properties.get(title_key).is_some_and(has_title_text) {
        tracing::debug!(title_key, "caller supplied the title property, keeping it");
        return false;
    }
    properties.insert(title_key.to_string(), title_value(title));
    true
}

/// `{"people": [...]}` entries of a property value, if it is a people value.
fn people_of(value: &Value) -> Option<&Vec<Value>> {
    value.get("people").and_then(Value::as_array)
}

fn is_empty_people(value: &Value) -> bool {
    people_of(value).is_some_and(Vec::is_empty)
}

fn mentions_user(properties: &Map<String, Value>, user_id: &str) -> bool {
    properties
        .values()
        .filter_map(people_of)
        .flatten()
        .any(|person| person.get("id").and_then(Value::as_str) == Some(user_id))
}

/// People-field auto-assignment for create operations.
#[derive(Debug, Clone, Copy)]
pub struct PeopleEnrichment<'a> {
    acting_user_id: Option<&'a str>,
    auto_assign: &'a AutoAssignConfig,
}

impl<'a> PeopleEnrichment<'a> {
    /// Blank user ids disable enrichment.
    pub fn new(acting_user_id: Option<&'a str>, auto_assign: &'a AutoAssignConfig) -> Self {
        Self {
            acting_user_id: acting_user_id.map(str::trim).filter(|id| !id.is_empty()),
            auto_assign,
        }
    }

    /// True when applying the rules could need the database schema.
    pub fn needs_schema(&self) -> bool {
        self.acting_user_id.is_some() && !self.auto_assign.properties.is_empty()
    }

    /// Fills eligible people properties with the acting user and returns the
    /// keys that were filled.
    ///
    /// Eligible: properties present with `{"people": []}`, then whitelisted
    /// properties that are absent from the bag and declared people-typed in
    /// `schema_people_keys`. Under [`DuplicateRolePolicy::Forbid`] at most one
    /// property is filled, and none when the acting user is already assigned.
    pub fn apply(
        &self,
        properties: &mut Map<String, Value>,
        schema_people_keys: Option<&BTreeSet<String>>,
    ) -> Vec<String> {
        let Some(user_id) = self.acting_user_id else {
            return Vec::new();
        };

        let mut candidates: Vec<String> = properties
            .iter()
            .filter(|(_, value)| is_empty_people(value))
            .map(|(key, _)| key.clone())
            .collect();

        if let Some(people_keys) = schema_people_keys {
            for key in &self.auto_assign.properties {
                if !properties.contains_key(key)
                    && people_keys.contains(key)
                    && !candidates.contains(key)
                {
                    candidates.push(key.clone());
                }
            }
        }

        if self.auto_assign.duplicate_roles == DuplicateRolePolicy::Forbid {
            if mentions_user(properties, user_id) {
                return Vec::new();
            }
            candidates.truncate(1);
        }

        for key in &candidates {
            properties.insert(key.clone(), json!({ "people": [{ "id": user_id }] }));
        }
        if !candidates.is_empty() {
            tracing::debug!(filled = ?candidates, "auto-assigned acting user");
        }
        candidates
    }
}
