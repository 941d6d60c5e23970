//! Event timing derivation

use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::event::EventRecord;

// Accepted timestamp shapes beyond RFC 3339. Feeds that omit the
// offset are taken to be UTC, the upstream ingest convention.
static NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

/// An unrecognized feed timestamp
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
#[error("unrecognized feed timestamp \"{0}\"")]
pub struct InvalidTimestamp(pub String);

/// Parse a feed timestamp
///
/// Accepts RFC 3339 plus the handful of legacy shapes the state
/// feeds actually emit. Timestamps without a UTC offset are assumed
/// to be UTC.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timcast::parse_feed_timestamp;
///
/// let jan15 = Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap();
///
/// assert_eq!(parse_feed_timestamp("2024-01-15T06:00:00Z"), Ok(jan15));
/// assert_eq!(parse_feed_timestamp("2024-01-15 06:00:00"), Ok(jan15));
/// assert_eq!(parse_feed_timestamp("01/15/2024 06:00"), Ok(jan15));
///
/// assert!(parse_feed_timestamp("soon").is_err());
/// ```
///
/// This is the strict seam beneath [`TimingInfo::derive()`], which
/// degrades to its documented defaults instead of reporting errors.
pub fn parse_feed_timestamp(text: &str) -> Result<DateTime<Utc>, InvalidTimestamp> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(InvalidTimestamp(text.to_owned()))
}

/// Derived timing and validity window for one event
///
/// Constructed with [`derive()`](TimingInfo::derive), which never
/// fails: a missing or unreadable start time becomes "now," and a
/// missing end time leaves the event active with an unknown duration.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timcast::{EventRecord, TimingInfo};
///
/// let mut event = EventRecord::new("UT-2024-0042");
/// event.start_time = Some("2024-01-01T00:00:00Z".to_owned());
/// event.end_time = Some("2024-01-01T05:00:00Z".to_owned());
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
/// let timing = TimingInfo::derive(&event, &now);
///
/// assert_eq!(timing.duration_hours(), Some(5));
/// assert_eq!(timing.duration_str(), "5 hours");
/// assert!(!timing.is_active());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimingInfo {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    duration_hours: Option<i64>,
    is_active: bool,
}

impl TimingInfo {
    /// Derive timing from an event record
    ///
    /// * `startTime` absent or unreadable ⇒ the event starts `now`,
    ///   so a message never claims to start in the unknown past
    /// * `endTime` absent or unreadable ⇒ the event is active and its
    ///   duration is unknown
    /// * both present ⇒ the duration is the window length rounded to
    ///   whole hours, and the event is active until `end` passes `now`
    pub fn derive(event: &EventRecord, now: &DateTime<Utc>) -> Self {
        let start = parse_optional(event, event.start_time.as_deref()).unwrap_or(*now);
        let end = parse_optional(event, event.end_time.as_deref());

        let duration_hours =
            end.map(|end| ((end - start).num_milliseconds() as f64 / 3_600_000.0).round() as i64);
        let is_active = end.map_or(true, |end| end > *now);

        Self {
            start,
            end,
            duration_hours,
            is_active,
        }
    }

    /// Start of the validity window
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the validity window, if the feed reported one
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Window length in whole hours, when both endpoints are known
    pub fn duration_hours(&self) -> Option<i64> {
        self.duration_hours
    }

    /// True unless the event's end has already passed
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Display string for the duration: "`5 hours`" or "`Unknown`"
    pub fn duration_str(&self) -> String {
        match self.duration_hours {
            Some(hours) => format!("{} hours", hours),
            None => "Unknown".to_owned(),
        }
    }
}

// Parse one optional timestamp field, degrading to None
fn parse_optional(event: &EventRecord, field: Option<&str>) -> Option<DateTime<Utc>> {
    match field {
        Some(text) => match parse_feed_timestamp(text) {
            Ok(datetime) => Some(datetime),
            Err(err) => {
                debug!("event {}: {}", event.id, err);
                None
            }
        },
        None => None,
    }
}

impl Serialize for TimingInfo {
    /// Serializes as the structured object consumed by displays.
    ///
    /// `durationHours` is a number when known and the string
    /// "`Unknown`" when not, matching the display contract.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TimingInfo", 4)?;
        state.serialize_field("startTime", &self.start)?;
        state.serialize_field("endTime", &self.end)?;
        match self.duration_hours {
            Some(hours) => state.serialize_field("durationHours", &hours)?,
            None => state.serialize_field("durationHours", "Unknown")?,
        }
        state.serialize_field("isActive", &self.is_active)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_feed_timestamp() {
        let expect = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

        assert_eq!(parse_feed_timestamp("2024-01-15T12:00:00Z"), Ok(expect));
        assert_eq!(parse_feed_timestamp("2024-01-15T06:00:00-06:00"), Ok(expect));
        assert_eq!(parse_feed_timestamp("2024-01-15T12:00:00"), Ok(expect));
        assert_eq!(
            parse_feed_timestamp("2024-01-15T12:00:00.250"),
            Ok(expect + chrono::Duration::milliseconds(250))
        );
        assert_eq!(parse_feed_timestamp("2024-01-15 12:00:00"), Ok(expect));
        assert_eq!(parse_feed_timestamp("01/15/2024 12:00"), Ok(expect));
        assert_eq!(parse_feed_timestamp("  2024-01-15T12:00:00Z  "), Ok(expect));

        assert_eq!(
            parse_feed_timestamp("soon"),
            Err(InvalidTimestamp("soon".to_owned()))
        );
        assert_eq!(
            "unrecognized feed timestamp \"soon\"",
            format!("{}", InvalidTimestamp("soon".to_owned()))
        );
    }

    #[test]
    fn test_complete_window() {
        let mut event = EventRecord::new("test");
        event.start_time = Some("2024-01-01T00:00:00Z".to_owned());
        event.end_time = Some("2024-01-01T05:00:00Z".to_owned());

        let timing = TimingInfo::derive(&event, &noon());
        assert_eq!(
            timing.start(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            timing.end(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap())
        );
        assert_eq!(timing.duration_hours(), Some(5));
        assert_eq!(timing.duration_str(), "5 hours");
        assert!(!timing.is_active());
    }

    #[test]
    fn test_open_window_is_active() {
        let mut event = EventRecord::new("test");
        event.start_time = Some("2024-01-01T00:00:00Z".to_owned());

        let timing = TimingInfo::derive(&event, &noon());
        assert!(timing.is_active());
        assert_eq!(timing.end(), None);
        assert_eq!(timing.duration_hours(), None);
        assert_eq!(timing.duration_str(), "Unknown");
    }

    #[test]
    fn test_future_end_is_active() {
        let mut event = EventRecord::new("test");
        event.start_time = Some("2024-01-15T00:00:00Z".to_owned());
        event.end_time = Some("2024-01-16T00:00:00Z".to_owned());

        let timing = TimingInfo::derive(&event, &noon());
        assert!(timing.is_active());
        assert_eq!(timing.duration_hours(), Some(24));
    }

    #[test]
    fn test_absent_start_defaults_to_now() {
        let event = EventRecord::new("test");
        let timing = TimingInfo::derive(&event, &noon());
        assert_eq!(timing.start(), noon());
        assert!(timing.is_active());
    }

    #[test]
    fn test_unreadable_start_defaults_to_now() {
        let mut event = EventRecord::new("test");
        event.start_time = Some("soon".to_owned());
        event.end_time = Some("tomorrow-ish".to_owned());

        let timing = TimingInfo::derive(&event, &noon());
        assert_eq!(timing.start(), noon());
        assert_eq!(timing.end(), None);
        assert_eq!(timing.duration_str(), "Unknown");
    }

    #[test]
    fn test_duration_rounds_to_whole_hours() {
        let mut event = EventRecord::new("test");
        event.start_time = Some("2024-01-01T00:00:00Z".to_owned());
        event.end_time = Some("2024-01-01T01:30:00Z".to_owned());

        let timing = TimingInfo::derive(&event, &noon());
        assert_eq!(timing.duration_hours(), Some(2));

        event.end_time = Some("2024-01-01T01:20:00Z".to_owned());
        let timing = TimingInfo::derive(&event, &noon());
        assert_eq!(timing.duration_hours(), Some(1));
    }

    #[test]
    fn test_serialize_shape() {
        let mut event = EventRecord::new("test");
        event.start_time = Some("2024-01-01T00:00:00Z".to_owned());

        let timing = TimingInfo::derive(&event, &noon());
        let json = serde_json::to_value(timing).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "startTime": "2024-01-01T00:00:00Z",
                "endTime": null,
                "durationHours": "Unknown",
                "isActive": true,
            })
        );
    }
}
