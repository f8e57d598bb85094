//! Event times, busy intervals and overlap detection.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::domain::errors::ValidationError;

/// A half-open busy interval as reported by the free/busy lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusyInterval {
    pub start: String,
    pub end: String,
}

impl BusyInterval {
    fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((parse_instant(&self.start)?, parse_instant(&self.end)?))
    }

    /// Strict overlap; intervals that only touch do not conflict.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.bounds()
            .is_some_and(|(busy_start, busy_end)| busy_start < end && start < busy_end)
    }
}

/// Wall-clock date-time without an offset, as used with `timeZone`.
const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// IANA zone name, e.g. `Europe/Berlin`.
pub fn parse_zone(name: &str) -> Option<Tz> {
    name.trim().parse().ok()
}

/// A wall-clock time in `zone`. Times skipped by a DST gap yield `None`;
/// ambiguous times take the earlier instant.
fn local_instant(local: &str, zone: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(local, LOCAL_FORMAT).ok()?;
    parse_zone(zone)?
        .from_local_datetime(&naive)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

/// RFC 3339 instant, or a `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalizes an event time argument into the calendar's time object.
///
/// Accepts an RFC 3339 date-time, a `YYYY-MM-DD` date (all-day), a local
/// `YYYY-MM-DDTHH:MM:SS` date-time when `time_zone` is given, or an
/// already-shaped object.
pub fn event_time(
    value: &Value,
    time_zone: Option<&str>,
    parameter: &str,
    action: &str,
) -> Result<Value, ValidationError> {
    if time_zone.is_some_and(|tz| parse_zone(tz).is_none()) {
        return Err(ValidationError::invalid(
            "time_zone",
            action,
            "expected an IANA time zone name such as `Europe/Berlin`",
        ));
    }
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            if DateTime::parse_from_rfc3339(raw).is_ok()
                || (time_zone.is_some() && NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT).is_ok())
            {
                let mut time = Map::new();
                time.insert("dateTime".to_string(), json!(raw));
                if let Some(tz) = time_zone {
                    time.insert("timeZone".to_string(), json!(tz));
                }
                Ok(Value::Object(time))
            } else if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
                Ok(json!({ "date": raw }))
            } else {
                Err(ValidationError::invalid(
                    parameter,
                    action,
                    "expected an RFC 3339 date-time or a YYYY-MM-DD date",
                ))
            }
        }
        Value::Object(map) if map.contains_key("dateTime") || map.contains_key("date") => {
            let mut time = map.clone();
            if let Some(tz) = time_zone {
                if time.contains_key("dateTime") && !time.contains_key("timeZone") {
                    time.insert("timeZone".to_string(), json!(tz));
                }
            }
            Ok(Value::Object(time))
        }
        _ => Err(ValidationError::invalid(
            parameter,
            action,
            "expected a string or an object with `dateTime` or `date`",
        )),
    }
}

/// The instant of a normalized event time object. Local date-times are
/// resolved through their `timeZone`; without one there is no instant.
pub fn instant_of(time: &Value) -> Option<DateTime<Utc>> {
    if let Some(date_time) = time.get("dateTime").and_then(Value::as_str) {
        return parse_instant(date_time).or_else(|| {
            let zone = time.get("timeZone").and_then(Value::as_str)?;
            local_instant(date_time, zone)
        });
    }
    time.get("date").and_then(Value::as_str).and_then(parse_instant)
}

/// Wall-clock reading of a zone-less `dateTime`.
pub fn naive_of(time: &Value) -> Option<NaiveDateTime> {
    let date_time = time.get("dateTime").and_then(Value::as_str)?;
    NaiveDateTime::parse_from_str(date_time, LOCAL_FORMAT).ok()
}

/// An all-day time (`date` only); its end is exclusive.
pub fn is_all_day(time: &Value) -> bool {
    time.get("date").is_some() && time.get("dateTime").is_none()
}

/// Busy intervals for one calendar out of a free/busy response.
pub fn busy_intervals(freebusy: &Value, calendar_id: &str) -> Vec<BusyInterval> {
    freebusy
        .get("calendars")
        .and_then(|calendars| calendars.get(calendar_id))
        .and_then(|calendar| calendar.get("busy"))
        .and_then(Value::as_array)
        .map(|busy| {
            busy.iter()
                .filter_map(|interval| {
                    Some(BusyInterval {
                        start: interval.get("start")?.as_str()?.to_string(),
                        end: interval.get("end")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Busy intervals overlapping `[start, end)`.
pub fn overlapping(
    busy: Vec<BusyInterval>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<BusyInterval> {
    busy.into_iter()
        .filter(|interval| interval.overlaps(start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> DateTime<Utc> {
        parse_instant(value).unwrap()
    }

    #[test]
    fn test_event_time_shapes() {
        assert_eq!(
            event_time(&json!("2024-05-01T09:00:00Z"), None, "start", "create_event").unwrap(),
            json!({ "dateTime": "2024-05-01T09:00:00Z" })
        );
        assert_eq!(
            event_time(
                &json!("2024-05-01T09:00:00"),
                Some("Europe/Berlin"),
                "start",
                "create_event"
            )
            .unwrap(),
            json!({ "dateTime": "2024-05-01T09:00:00", "timeZone": "Europe/Berlin" })
        );
        assert_eq!(
            event_time(&json!("2024-05-01"), None, "start", "create_event").unwrap(),
            json!({ "date": "2024-05-01" })
        );
        assert_eq!(
            event_time(&json!({ "date": "2024-05-01" }), None, "end", "create_event").unwrap(),
            json!({ "date": "2024-05-01" })
        );
    }

    #[test]
    fn test_event_time_rejects_garbage() {
        let err = event_time(&json!("next tuesday"), None, "start", "create_event").unwrap_err();
        assert_eq!(err.reason(), "InvalidParameter");
        assert!(err.to_string().contains("`start`"));

        assert!(event_time(&json!(42), None, "end", "update_event").is_err());
        assert!(event_time(&json!({ "when": "now" }), None, "end", "update_event").is_err());
    }

    #[test]
    fn test_overlap_is_strict() {
        let busy = vec![
            BusyInterval {
                start: "2024-05-01T09:00:00Z".to_string(),
                end: "2024-05-01T10:00:00Z".to_string(),
            },
            BusyInterval {
                start: "2024-05-01T10:30:00Z".to_string(),
                end: "2024-05-01T11:00:00Z".to_string(),
            },
        ];
        let found = overlapping(busy, at("2024-05-01T10:00:00Z"), at("2024-05-01T10:45:00Z"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, "2024-05-01T10:30:00Z");
    }

    #[test]
    fn test_busy_intervals_from_response() {
        let response = json!({
            "calendars": {
                "primary": { "busy": [{ "start": "2024-05-01T09:00:00Z", "end": "2024-05-01T10:00:00Z" }] }
            }
        });
        assert_eq!(busy_intervals(&response, "primary").len(), 1);
        assert!(busy_intervals(&response, "other").is_empty());
    }

    #[test]
    fn test_instant_of_date_and_datetime() {
        assert_eq!(
            instant_of(&json!({ "dateTime": "2024-05-01T09:00:00+02:00" })),
            Some(at("2024-05-01T07:00:00Z"))
        );
        assert_eq!(
            instant_of(&json!({ "date": "2024-05-01" })),
            Some(at("2024-05-01T00:00:00Z"))
        );
        assert_eq!(instant_of(&json!({ "dateTime": "2024-05-01T09:00:00" })), None);
    }

    #[test]
    fn test_local_time_resolves_through_zone() {
        assert_eq!(
            instant_of(&json!({ "dateTime": "2024-05-01T09:00:00", "timeZone": "Europe/Berlin" })),
            Some(at("2024-05-01T07:00:00Z"))
        );
        assert_eq!(
            instant_of(&json!({ "dateTime": "2024-01-15T09:00:00", "timeZone": "America/New_York" })),
            Some(at("2024-01-15T14:00:00Z"))
        );
        assert_eq!(
            naive_of(&json!({ "dateTime": "2024-05-01T09:00:00" })).map(|t| t.to_string()),
            Some("2024-05-01 09:00:00".to_string())
        );
        assert!(is_all_day(&json!({ "date": "2024-05-01" })));
        assert!(!is_all_day(&json!({ "dateTime": "2024-05-01T09:00:00Z" })));
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        let err = event_time(&json!("2024-05-01T09:00:00"), Some("Mars/Olympus"), "start", "create_event")
            .unwrap_err();
        assert!(err.to_string().contains("`time_zone`"));
    }
}
