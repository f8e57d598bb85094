//! Calendar service actions.

use serde::Deserialize;
use serde_json::Value;

use super::action::{param, ActionSpec, ParamKind, ParamSpec};
use super::args::StringList;

/// Default result cap for event listings and searches.
pub const DEFAULT_MAX_EVENTS: u32 = 10;
/// Default result cap for the calendar list.
pub const DEFAULT_MAX_CALENDARS: u32 = 50;
/// Literal calendar used when nothing else resolves.
pub const FALLBACK_CALENDAR_ID: &str = "primary";

const CALENDAR_ID: ParamSpec = param("calendar_id", ParamKind::String, "Calendar id");
const CALENDAR: ParamSpec = param(
    "calendar",
    ParamKind::String,
    "Calendar alias from configuration (used when calendar_id is absent)",
);
const EVENT_ID: ParamSpec = param("event_id", ParamKind::String, "Event id");
const TIME_MIN: ParamSpec = param("time_min", ParamKind::String, "Window start (RFC 3339)");
const TIME_MAX: ParamSpec = param("time_max", ParamKind::String, "Window end (RFC 3339)");
const MAX_RESULTS: ParamSpec = param("max_results", ParamKind::Integer, "Maximum results");
const PAGE_TOKEN: ParamSpec = param(
    "page_token",
    ParamKind::String,
    "Continuation token returned by a previous call",
);
const SUMMARY: ParamSpec = param("summary", ParamKind::String, "Event title");
const START: ParamSpec = param(
    "start",
    ParamKind::StringOrObject,
    "Start as RFC 3339 date-time, YYYY-MM-DD date, or event time object",
);
const END: ParamSpec = param(
    "end",
    ParamKind::StringOrObject,
    "End as RFC 3339 date-time, YYYY-MM-DD date, or event time object",
);
const DESCRIPTION: ParamSpec = param("description", ParamKind::String, "Event description");
const LOCATION: ParamSpec = param("location", ParamKind::String, "Event location");
const ATTENDEES: ParamSpec = param(
    "attendees",
    ParamKind::StringArray,
    "Attendee email addresses",
);
const TIME_ZONE: ParamSpec = param("time_zone", ParamKind::String, "IANA time zone name");

/// Action table for the calendar capability.
pub const CALENDAR_ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "list_calendars",
        description: "List calendars visible to the account",
        required: &[],
        optional: &[MAX_RESULTS, PAGE_TOKEN],
    },
    ActionSpec {
        name: "list_events",
        description: "List events in a calendar, optionally within a time window",
        required: &[],
        optional: &[
            CALENDAR_ID,
            CALENDAR,
            TIME_MIN,
            TIME_MAX,
            param("query", ParamKind::String, "Free-text filter"),
            MAX_RESULTS,
            PAGE_TOKEN,
            param(
                "single_events",
                ParamKind::Boolean,
                "Expand recurring events (default true)",
            ),
            param("order_by", ParamKind::String, "`startTime` or `updated`"),
        ],
    },
    ActionSpec {
        name: "search_events",
        description: "Search events by free text",
        required: &[param("query", ParamKind::String, "Free-text query")],
        optional: &[CALENDAR_ID, CALENDAR, TIME_MIN, TIME_MAX, MAX_RESULTS],
    },
    ActionSpec {
        name: "get_event",
        description: "Retrieve one event",
        required: &[EVENT_ID],
        optional: &[CALENDAR_ID, CALENDAR],
    },
    ActionSpec {
        name: "create_event",
        description: "Create an event, reporting or blocking on overlapping busy time",
        required: &[SUMMARY, START, END],
        optional: &[
            CALENDAR_ID,
            CALENDAR,
            DESCRIPTION,
            LOCATION,
            ATTENDEES,
            TIME_ZONE,
            param("recurrence", ParamKind::StringArray, "RRULE lines"),
            param("reminders", ParamKind::Object, "Reminder settings"),
            param(
                "conflict_policy",
                ParamKind::String,
                "`ignore`, `annotate` or `block`; overrides the configured policy",
            ),
            param(
                "skip_duplicates",
                ParamKind::Boolean,
                "Return an existing event with the same summary and start instead of creating one",
            ),
        ],
    },
    ActionSpec {
        name: "quick_add_event",
        description: "Create an event from a natural-language sentence",
        required: &[param("text", ParamKind::String, "Sentence describing the event")],
        optional: &[CALENDAR_ID, CALENDAR],
    },
    ActionSpec {
        name: "update_event",
        description: "Update only the supplied event fields",
        required: &[EVENT_ID],
        optional: &[
            CALENDAR_ID,
            CALENDAR,
            SUMMARY,
            DESCRIPTION,
            LOCATION,
            START,
            END,
            ATTENDEES,
            TIME_ZONE,
        ],
    },
    ActionSpec {
        name: "delete_event",
        description: "Delete an event",
        required: &[EVENT_ID],
        optional: &[CALENDAR_ID, CALENDAR],
    },
    ActionSpec {
        name: "get_freebusy",
        description: "Return busy intervals for one or more calendars",
        required: &[TIME_MIN, TIME_MAX],
        optional: &[
            param("calendar_ids", ParamKind::StringArray, "Calendar ids"),
            param("calendars", ParamKind::StringArray, "Calendar aliases"),
            TIME_ZONE,
        ],
    },
];

/// Calendar reference shared by event-scoped actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CalendarRef {
    pub calendar_id: Option<String>,
    /// Alias resolved through configuration.
    pub calendar: Option<String>,
}

/// Arguments of `list_calendars`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListCalendarsArgs {
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

/// Arguments of `list_events`. Defaults expand recurring events in start order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListEventsArgs {
    #[serde(flatten)]
    pub target: CalendarRef,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub query: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    pub single_events: Option<bool>,
    pub order_by: Option<String>,
}

/// Arguments of `search_events`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchEventsArgs {
    pub query: String,
    #[serde(flatten)]
    pub target: CalendarRef,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub max_results: Option<u32>,
}

/// Arguments naming one event: `get_event` and `delete_event`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventIdArgs {
    pub event_id: String,
    #[serde(flatten)]
    pub target: CalendarRef,
}

/// Arguments of `create_event`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateEventArgs {
    pub summary: String,
    /// RFC 3339, a local date-time with `time_zone`, a date, or an event time object.
    pub start: Value,
    pub end: Value,
    #[serde(flatten)]
    pub target: CalendarRef,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<StringList>,
    /// IANA zone applied to local `start` and `end`.
    pub time_zone: Option<String>,
    pub recurrence: Option<StringList>,
    pub reminders: Option<Value>,
    /// `ignore`, `annotate` or `block`; overrides the configured policy.
    pub conflict_policy: Option<String>,
    #[serde(default)]
    pub skip_duplicates: bool,
}

/// Arguments of `quick_add`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuickAddArgs {
    pub text: String,
    #[serde(flatten)]
    pub target: CalendarRef,
}

/// Arguments of `update_event`; at least one field besides the id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateEventArgs {
    pub event_id: String,
    #[serde(flatten)]
    pub target: CalendarRef,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub attendees: Option<StringList>,
    pub time_zone: Option<String>,
}

/// Arguments of `free_busy`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FreeBusyArgs {
    pub time_min: String,
    pub time_max: String,
    pub calendar_ids: Option<StringList>,
    pub calendars: Option<StringList>,
    pub time_zone: Option<String>,
}

/// A validated calendar invocation, one variant per action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CalendarAction {
    ListCalendars(ListCalendarsArgs),
    ListEvents(ListEventsArgs),
    SearchEvents(SearchEventsArgs),
    GetEvent(EventIdArgs),
    CreateEvent(CreateEventArgs),
    QuickAddEvent(QuickAddArgs),
    UpdateEvent(UpdateEventArgs),
    DeleteEvent(EventIdArgs),
    #[serde(rename = "get_freebusy")]
    GetFreeBusy(FreeBusyArgs),
}

impl CalendarAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListCalendars(_) => "list_calendars",
            Self::ListEvents(_) => "list_events",
            Self::SearchEvents(_) => "search_events",
            Self::GetEvent(_) => "get_event",
            Self::CreateEvent(_) => "create_event",
            Self::QuickAddEvent(_) => "quick_add_event",
            Self::UpdateEvent(_) => "update_event",
            Self::DeleteEvent(_) => "delete_event",
            Self::GetFreeBusy(_) => "get_freebusy",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_freebusy_rename() {
        let action: CalendarAction = serde_json::from_value(json!({
            "action": "get_freebusy",
            "time_min": "2024-05-01T00:00:00Z",
            "time_max": "2024-05-02T00:00:00Z",
            "calendars": "work"
        }))
        .unwrap();
        assert_eq!(action.name(), "get_freebusy");
    }

    #[test]
    fn test_create_event_accepts_string_and_object_times() {
        let action: CalendarAction = serde_json::from_value(json!({
            "action": "create_event",
            "summary": "Standup",
            "start": "2024-05-01T09:00:00Z",
            "end": { "dateTime": "2024-05-01T09:15:00Z" },
            "attendees": ["a@x.com"]
        }))
        .unwrap();
        match action {
            CalendarAction::CreateEvent(args) => {
                assert!(args.start.is_string());
                assert!(args.end.is_object());
                assert!(!args.skip_duplicates);
                assert_eq!(args.attendees.unwrap().into_vec(), vec!["a@x.com"]);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }
}
