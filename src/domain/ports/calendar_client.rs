//! Calendar service port.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainResult;

/// Event listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub query: Option<String>,
    pub max_results: u32,
    pub page_token: Option<String>,
    pub single_events: bool,
    pub order_by: Option<String>,
}

/// Free/busy lookup over a set of calendars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeBusyRequest {
    pub time_min: String,
    pub time_max: String,
    pub calendar_ids: Vec<String>,
    pub time_zone: Option<String>,
}

/// Port for the calendar service.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn list_calendars(
        &self,
        max_results: u32,
        page_token: Option<String>,
    ) -> DomainResult<Value>;

    async fn list_events(&self, calendar_id: &str, query: EventQuery) -> DomainResult<Value>;

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> DomainResult<Value>;

    async fn insert_event(&self, calendar_id: &str, event: Value) -> DomainResult<Value>;

    async fn quick_add(&self, calendar_id: &str, text: &str) -> DomainResult<Value>;

    /// Sends only the supplied fields.
    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: Value,
    ) -> DomainResult<Value>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> DomainResult<()>;

    /// Read-only.
    async fn free_busy(&self, request: FreeBusyRequest) -> DomainResult<Value>;
}
