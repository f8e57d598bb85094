//! Calendar capability: calendars, events and free/busy.

use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::domain::errors::{DomainResult, ValidationError};
use crate::domain::models::args::{list_or_empty, non_blank, StringList};
use crate::domain::models::calendar::{
    CalendarRef, CreateEventArgs, EventIdArgs, FreeBusyArgs, ListCalendarsArgs, ListEventsArgs,
    QuickAddArgs, SearchEventsArgs, UpdateEventArgs, DEFAULT_MAX_CALENDARS, DEFAULT_MAX_EVENTS,
    FALLBACK_CALENDAR_ID,
};
use crate::domain::models::{CalendarAction, CalendarConfig, ConflictPolicy};
use crate::domain::ports::{CalendarClient, EventQuery, FreeBusyRequest};

use super::conflict::{
    busy_intervals, event_time, instant_of, is_all_day, naive_of, overlapping, parse_instant,
    BusyInterval,
};
use super::resolver::IdentifierResolver;
use super::shaping::{self, field, ListPage};

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn attendee_list(attendees: StringList) -> Value {
    Value::Array(
        attendees
            .into_vec()
            .into_iter()
            .map(|email| json!({ "email": email }))
            .collect(),
    )
}

fn event_summary_text(event: &Value) -> String {
    event
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Two event times denote the same start.
fn same_start(existing: &Value, wanted: &Value) -> bool {
    match (instant_of(existing), instant_of(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => {
            let key = |time: &Value| {
                time.get("dateTime")
                    .or_else(|| time.get("date"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            key(existing).is_some() && key(existing) == key(wanted)
        }
    }
}

fn create_summary(raw: &Value) -> Map<String, Value> {
    shaping::created(field(raw, "id"), field(raw, "htmlLink"), field(raw, "created"))
}

/// Handlers for every calendar action.
pub struct CalendarActions {
    client: Arc<dyn CalendarClient>,
    config: CalendarConfig,
}

impl CalendarActions {
    /// Handler over `client`, resolving calendars through `config`.
    pub fn new(client: Arc<dyn CalendarClient>, config: CalendarConfig) -> Self {
        Self { client, config }
    }

    /// Runs one validated calendar action and returns its shaped result.
    pub async fn execute(&self, action: CalendarAction) -> DomainResult<Value> {
        let name = action.name();
        match action {
            CalendarAction::ListCalendars(ListCalendarsArgs {
                max_results,
                page_token,
            }) => {
                let raw = self
                    .client
                    .list_calendars(max_results.unwrap_or(DEFAULT_MAX_CALENDARS), page_token)
                    .await?;
                Ok(ListPage::from_google(raw, "items").into_value())
            }
            CalendarAction::ListEvents(args) => self.list_events(args).await,
            CalendarAction::SearchEvents(args) => self.search_events(args).await,
            CalendarAction::GetEvent(EventIdArgs { event_id, target }) => {
                let calendar_id = self.resolve_calendar(&target);
                self.client.get_event(&calendar_id, &event_id).await
            }
            CalendarAction::CreateEvent(args) => self.create_event(args, name).await,
            CalendarAction::QuickAddEvent(QuickAddArgs { text, target }) => {
                let calendar_id = self.resolve_calendar(&target);
                let raw = self.client.quick_add(&calendar_id, &text).await?;
                Ok(Value::Object(create_summary(&raw)))
            }
            CalendarAction::UpdateEvent(args) => self.update_event(args, name).await,
            CalendarAction::DeleteEvent(EventIdArgs { event_id, target }) => {
                let calendar_id = self.resolve_calendar(&target);
                self.client.delete_event(&calendar_id, &event_id).await?;
                Ok(shaping::deleted(&event_id))
            }
            CalendarAction::GetFreeBusy(args) => self.free_busy(args, name).await,
        }
    }

    /// `calendar_id` > alias > configured default > `primary`.
    fn resolve_calendar(&self, target: &CalendarRef) -> String {
        IdentifierResolver::new(
            &self.config.aliases,
            self.config.default_calendar_id.as_deref(),
        )
        .with_fallback(FALLBACK_CALENDAR_ID)
        .resolve(target.calendar_id.as_deref(), target.calendar.as_deref())
        .map_or_else(|| FALLBACK_CALENDAR_ID.to_string(), |resolved| resolved.id)
    }

    async fn list_events(&self, args: ListEventsArgs) -> DomainResult<Value> {
        let calendar_id = self.resolve_calendar(&args.target);
        let single_events = args.single_events.unwrap_or(true);
        let order_by = non_blank(args.order_by.as_deref())
            .map(str::to_string)
            .or_else(|| single_events.then(|| "startTime".to_string()));
        let query = EventQuery {
            time_min: args.time_min,
            time_max: args.time_max,
            query: args.query.filter(|q| !q.trim().is_empty()),
            max_results: args.max_results.unwrap_or(DEFAULT_MAX_EVENTS),
            page_token: args.page_token,
            single_events,
            order_by,
        };
        let raw = self.client.list_events(&calendar_id, query).await?;
        Ok(ListPage::from_google(raw, "items").into_value())
    }

    async fn search_events(&self, args: SearchEventsArgs) -> DomainResult<Value> {
        let calendar_id = self.resolve_calendar(&args.target);
        let query = EventQuery {
            time_min: args.time_min,
            time_max: args.time_max,
            query: Some(args.query),
            max_results: args.max_results.unwrap_or(DEFAULT_MAX_EVENTS),
            page_token: None,
            single_events: true,
            order_by: Some("startTime".to_string()),
        };
        let raw = self.client.list_events(&calendar_id, query).await?;
        Ok(ListPage::from_google(raw, "items")
            .map_items(|event| {
                shaping::search_item(
                    field(&event, "id"),
                    "event",
                    event_summary_text(&event),
                    field(&event, "htmlLink"),
                )
            })
            .into_value())
    }

    async fn create_event(&self, args: CreateEventArgs, action: &str) -> DomainResult<Value> {
        let policy = match non_blank(args.conflict_policy.as_deref()) {
            Some(raw) => ConflictPolicy::parse(raw).ok_or_else(|| {
                ValidationError::invalid(
                    "conflict_policy",
                    action,
                    "expected `ignore`, `annotate` or `block`",
                )
            })?,
            None => self.config.conflict_policy,
        };
        let time_zone = non_blank(args.time_zone.as_deref());
        let start = event_time(&args.start, time_zone, "start", action)?;
        let end = event_time(&args.end, time_zone, "end", action)?;
        let calendar_id = self.resolve_calendar(&args.target);
        let window = instant_of(&start).zip(instant_of(&end));

        let all_day = is_all_day(&start) || is_all_day(&end);
        let inverted = match window {
            Some((start_at, end_at)) => end_at < start_at || (all_day && end_at == start_at),
            None => naive_of(&start)
                .zip(naive_of(&end))
                .is_some_and(|(start_at, end_at)| end_at < start_at),
        };
        if inverted {
            let reason = if all_day {
                "end date must be after start date"
            } else {
                "end is before start"
            };
            return Err(ValidationError::invalid("end", action, reason).into());
        }

        if args.skip_duplicates {
            if let Some(existing) = self
                .find_duplicate(&calendar_id, &args.summary, &start, window)
                .await?
            {
                tracing::info!(
                    calendar_id = %calendar_id,
                    event_id = %field(&existing, "id"),
                    "matching event already exists, skipping insert"
                );
                let mut summary = create_summary(&existing);
                summary.insert("duplicate".to_string(), Value::Bool(true));
                return Ok(Value::Object(summary));
            }
        }

        let conflicts = match (policy, window) {
            (ConflictPolicy::Ignore, _) => None,
            (ConflictPolicy::Block, None) => {
                return Err(ValidationError::InvalidArguments {
                    action: action.to_string(),
                    reason: "conflict_policy `block` needs start and end that resolve to instants; \
                             pass RFC 3339 times or a `time_zone`"
                        .to_string(),
                }
                .into());
            }
            (_, None) => {
                tracing::debug!("event window has no fixed instants, skipping conflict check");
                None
            }
            (policy, Some((start_at, end_at))) => {
                match self.conflicts(&calendar_id, start_at, end_at).await {
                    Ok(found) => Some(found),
                    Err(err) if policy == ConflictPolicy::Annotate => {
                        tracing::warn!(error = %err, "conflict lookup failed, creating event anyway");
                        None
                    }
                    Err(err) => return Err(err),
                }
            }
        };

        if policy == ConflictPolicy::Block {
            if let Some(found) = conflicts.as_ref().filter(|found| !found.is_empty()) {
                return Err(ValidationError::SchedulingConflict {
                    action: action.to_string(),
                    conflicts: found.len(),
                }
                .into());
            }
        }

        let mut event = Map::new();
        event.insert("summary".to_string(), json!(args.summary));
        event.insert("start".to_string(), start);
        event.insert("end".to_string(), end);
        if let Some(description) = args.description {
            event.insert("description".to_string(), json!(description));
        }
        if let Some(location) = args.location {
            event.insert("location".to_string(), json!(location));
        }
        if let Some(attendees) = args.attendees {
            event.insert("attendees".to_string(), attendee_list(attendees));
        }
        let recurrence = list_or_empty(args.recurrence);
        if !recurrence.is_empty() {
            event.insert("recurrence".to_string(), json!(recurrence));
        }
        if let Some(reminders) = args.reminders.filter(|r| !r.is_null()) {
            event.insert("reminders".to_string(), reminders);
        }

        let raw = self
            .client
            .insert_event(&calendar_id, Value::Object(event))
            .await?;
        let mut summary = create_summary(&raw);
        if policy == ConflictPolicy::Annotate {
            if let Some(found) = conflicts {
                summary.insert("conflicts".to_string(), json!(found));
            }
        }
        Ok(Value::Object(summary))
    }

    /// An event in the target window with the same summary and start.
    async fn find_duplicate(
        &self,
        calendar_id: &str,
        summary: &str,
        start: &Value,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> DomainResult<Option<Value>> {
        let (time_min, time_max) = match window {
            Some((start_at, end_at)) => {
                let end_at = end_at.max(start_at + Duration::minutes(1));
                (Some(rfc3339(start_at)), Some(rfc3339(end_at)))
            }
            None => (None, None),
        };
        let query = EventQuery {
            time_min,
            time_max,
            query: Some(summary.to_string()),
            max_results: DEFAULT_MAX_EVENTS,
            page_token: None,
            single_events: true,
            order_by: None,
        };
        let raw = self.client.list_events(calendar_id, query).await?;
        Ok(ListPage::from_google(raw, "items")
            .items
            .into_iter()
            .find(|event| {
                event_summary_text(event) == summary
                    && event.get("start").is_some_and(|s| same_start(s, start))
            }))
    }

    async fn conflicts(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<BusyInterval>> {
        let request = FreeBusyRequest {
            time_min: rfc3339(start),
            time_max: rfc3339(end),
            calendar_ids: vec![calendar_id.to_string()],
            time_zone: None,
        };
        let raw = self.client.free_busy(request).await?;
        Ok(overlapping(busy_intervals(&raw, calendar_id), start, end))
    }

    async fn update_event(&self, args: UpdateEventArgs, action: &str) -> DomainResult<Value> {
        let time_zone = non_blank(args.time_zone.as_deref());
        let mut patch = Map::new();
        if let Some(summary) = args.summary {
            patch.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = args.description {
            patch.insert("description".to_string(), json!(description));
        }
        if let Some(location) = args.location {
            patch.insert("location".to_string(), json!(location));
        }
        if let Some(start) = args.start.filter(|v| !v.is_null()) {
            patch.insert("start".to_string(), event_time(&start, time_zone, "start", action)?);
        }
        if let Some(end) = args.end.filter(|v| !v.is_null()) {
            patch.insert("end".to_string(), event_time(&end, time_zone, "end", action)?);
        }
        if let Some(attendees) = args.attendees {
            patch.insert("attendees".to_string(), attendee_list(attendees));
        }
        if patch.is_empty() {
            return Err(ValidationError::InvalidArguments {
                action: action.to_string(),
                reason: "no event fields to update".to_string(),
            }
            .into());
        }

        let calendar_id = self.resolve_calendar(&args.target);
        let raw = self
            .client
            .patch_event(&calendar_id, &args.event_id, Value::Object(patch))
            .await?;
        Ok(Value::Object(shaping::updated(
            field(&raw, "id"),
            field(&raw, "htmlLink"),
            field(&raw, "updated"),
        )))
    }

    async fn free_busy(&self, args: FreeBusyArgs, action: &str) -> DomainResult<Value> {
        for (parameter, value) in [("time_min", &args.time_min), ("time_max", &args.time_max)] {
            if parse_instant(value.trim()).is_none() {
                return Err(ValidationError::invalid(
                    parameter,
                    action,
                    "expected an RFC 3339 date-time",
                )
                .into());
            }
        }

        let resolver = IdentifierResolver::new(&self.config.aliases, None);
        let mut calendar_ids = list_or_empty(args.calendar_ids);
        for alias in list_or_empty(args.calendars) {
            let id = resolver
                .lookup_alias(&alias)
                .map_or(alias, str::to_string);
            if !calendar_ids.contains(&id) {
                calendar_ids.push(id);
            }
        }
        if calendar_ids.is_empty() {
            calendar_ids.push(self.resolve_calendar(&CalendarRef::default()));
        }

        let request = FreeBusyRequest {
            time_min: args.time_min.trim().to_string(),
            time_max: args.time_max.trim().to_string(),
            calendar_ids: calendar_ids.clone(),
            time_zone: non_blank(args.time_zone.as_deref()).map(str::to_string),
        };
        let raw = self.client.free_busy(request.clone()).await?;

        let calendars: Map<String, Value> = calendar_ids
            .iter()
            .map(|id| (id.clone(), json!(busy_intervals(&raw, id))))
            .collect();
        Ok(json!({
            "calendars": calendars,
            "timeMin": raw.get("timeMin").cloned().unwrap_or_else(|| json!(request.time_min)),
            "timeMax": raw.get("timeMax").cloned().unwrap_or_else(|| json!(request.time_max)),
        }))
    }
}
