//! HTTP client for the calendar REST API (v3).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{json, Value};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CalendarConfig, HttpConfig};
use crate::domain::ports::{CalendarClient, CredentialProvider, EventQuery, FreeBusyRequest};
use crate::infrastructure::http::ApiTransport;

const SERVICE: &str = "calendar";

/// reqwest implementation of [`CalendarClient`].
#[derive(Debug, Clone)]
pub struct HttpCalendarClient {
    transport: ApiTransport,
}

impl HttpCalendarClient {
    /// Client for the calendar API at the configured `base_url`.
    pub fn new(
        config: &CalendarConfig,
        http: &HttpConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> DomainResult<Self> {
        Ok(Self {
            transport: ApiTransport::new(
                SERVICE,
                &config.base_url,
                http,
                credentials,
                HeaderMap::new(),
            )?,
        })
    }
}

#[async_trait]
impl CalendarClient for HttpCalendarClient {
    async fn list_calendars(
        &self,
        max_results: u32,
        page_token: Option<String>,
    ) -> DomainResult<Value> {
        let mut query = vec![("maxResults", max_results.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        self.transport
            .get(&["users", "me", "calendarList"], query)
            .await
    }

    async fn list_events(&self, calendar_id: &str, request: EventQuery) -> DomainResult<Value> {
        let mut query = vec![
            ("maxResults", request.max_results.to_string()),
            ("singleEvents", request.single_events.to_string()),
        ];
        if let Some(time_min) = request.time_min {
            query.push(("timeMin", time_min));
        }
        if let Some(time_max) = request.time_max {
            query.push(("timeMax", time_max));
        }
        if let Some(q) = request.query {
            query.push(("q", q));
        }
        if let Some(token) = request.page_token {
            query.push(("pageToken", token));
        }
        if let Some(order_by) = request.order_by {
            query.push(("orderBy", order_by));
        }
        self.transport
            .get(&["calendars", calendar_id, "events"], query)
            .await
    }

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> DomainResult<Value> {
        self.transport
            .get(&["calendars", calendar_id, "events", event_id], Vec::new())
            .await
    }

    async fn insert_event(&self, calendar_id: &str, event: Value) -> DomainResult<Value> {
        self.transport
            .post(&["calendars", calendar_id, "events"], Some(&event))
            .await
    }

    async fn quick_add(&self, calendar_id: &str, text: &str) -> DomainResult<Value> {
        self.transport
            .send(
                Method::POST,
                &["calendars", calendar_id, "events", "quickAdd"],
                vec![("text", text.to_string())],
                None,
            )
            .await
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: Value,
    ) -> DomainResult<Value> {
        self.transport
            .patch(&["calendars", calendar_id, "events", event_id], &patch)
            .await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> DomainResult<()> {
        self.transport
            .delete(&["calendars", calendar_id, "events", event_id])
            .await
            .map(|_| ())
    }

    async fn free_busy(&self, request: FreeBusyRequest) -> DomainResult<Value> {
        let items: Vec<Value> = request
            .calendar_ids
            .iter()
            .map(|id| json!({ "id": id }))
            .collect();
        let mut body = json!({
            "timeMin": request.time_min,
            "timeMax": request.time_max,
            "items": items,
        });
        if let Some(tz) = request.time_zone {
            body["timeZone"] = json!(tz);
        }
        self.transport.post(&["freeBusy"], Some(&body)).await
    }
}
