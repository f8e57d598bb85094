//! Identifier resolution.
//!
//! Order: explicit identifier, then alias binding, then configured default,
//! then the fixed fallback. An unknown alias never fails; it falls through.

use std::collections::BTreeMap;

use crate::domain::models::args::non_blank;

/// Where a resolved identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Explicit,
    Alias,
    Default,
    Fallback,
}

/// A concrete backing identifier and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    /// Identifier to send upstream.
    pub id: String,
    /// Which rule produced [`id`](Self::id).
    pub source: IdSource,
}

/// Resolution chain for one kind of container.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierResolver<'a> {
    aliases: &'a BTreeMap<String, String>,
    default_id: Option<&'a str>,
    fallback: Option<&'static str>,
}

impl<'a> IdentifierResolver<'a> {
    /// Resolver over a case-insensitive alias table and an optional default.
    pub fn new(aliases: &'a BTreeMap<String, String>, default_id: Option<&'a str>) -> Self {
        Self {
            aliases,
            default_id,
            fallback: None,
        }
    }

    /// Identifier used when nothing else applies, e.g. `primary`.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: &'static str) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Returns `None` only when no link of the chain yields an identifier.
    pub fn resolve(&self, explicit: Option<&str>, alias: Option<&str>) -> Option<ResolvedId> {
        if let Some(id) = non_blank(explicit) {
            return Some(ResolvedId {
                id: id.to_string(),
                source: IdSource::Explicit,
            });
        }

        if let Some(label) = non_blank(alias) {
            match self.lookup_alias(label) {
                Some(id) => {
                    return Some(ResolvedId {
                        id: id.to_string(),
                        source: IdSource::Alias,
                    })
                }
                None => tracing::debug!(alias = %label, "unknown alias, using default chain"),
            }
        }

        if let Some(id) = non_blank(self.default_id) {
            return Some(ResolvedId {
                id: id.to_string(),
                source: IdSource::Default,
            });
        }

        self.fallback.map(|id| ResolvedId {
            id: id.to_string(),
            source: IdSource::Fallback,
        })
    }

    /// Case-insensitive alias lookup; exact match wins.
    pub fn lookup_alias(&self, label: &str) -> Option<&'a str> {
        self.aliases
            .get(label)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(label))
                    .map(|(_, id)| id)
            })
            .map(String::as_str)
            .and_then(|id| non_blank(Some(id)))
    }
}
