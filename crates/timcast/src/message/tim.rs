//! Traveler information message formatting

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::event::{EventRecord, LooseValue};

use super::severity::Severity;
use super::timing::TimingInfo;
use super::typecode::TypeCode;

// Display fallbacks for missing fields
const UNKNOWN_ROUTE: &str = "Unknown Route";
const BOTH_DIRECTIONS: &str = "Both Directions";
const UNKNOWN_LOCATION: &str = "Unknown Location";

// Keywords implying relevance to commercial vehicle operators
static CV_KEYWORDS: &[&str] = &[
    "truck",
    "cmv",
    "commercial vehicle",
    "weight",
    "bridge",
    "clearance",
    "hazmat",
    "oversize",
    "wide load",
    "chain law",
];

/// Test whether an event merits a CV-TIM badge
///
/// A keyword test of the description field for terms implying
/// relevance to commercial (freight) vehicles: truck restrictions,
/// weight and clearance limits, hazmat, oversize loads, chain laws.
/// Drives a display badge only; false negatives are acceptable, and
/// a `false` here is a heuristic miss, not a regulatory finding.
///
/// ```
/// use timcast::{is_commercial_vehicle_relevant, EventRecord};
///
/// let mut event = EventRecord::new("WY-2024-0003");
/// event.description = Some("Chain law in effect for I-80 summit".to_owned());
/// assert!(is_commercial_vehicle_relevant(&event));
/// ```
pub fn is_commercial_vehicle_relevant(event: &EventRecord) -> bool {
    let text = event.description.as_deref().unwrap_or("").to_lowercase();
    CV_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// A traveler information message
///
/// A display-oriented approximation of an SAE J2735 traveler
/// information message: the classified [type](TypeCode), normalized
/// [severity](Severity), derived [timing](TimingInfo), and route,
/// location, and content blocks assembled from the raw record.
/// Constructed with [`from_event()`](TimMessage::from_event), which
/// never fails; missing inputs become documented display fallbacks.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timcast::{EventRecord, TimMessage, TypeCode};
///
/// let mut event = EventRecord::new("UT-2024-0042");
/// event.event_type = Some("Construction".to_owned());
/// event.description = Some("Bridge construction near Echo Junction".to_owned());
/// event.corridor = Some("I-80".to_owned());
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let tim = TimMessage::from_event(&event, &now);
///
/// assert_eq!(tim.data().message_id, "TIM-UT-2024-0042");
/// assert_eq!(tim.data().event_type, TypeCode::RoadWork);
/// assert_eq!(tim.data().content.headline, "Construction on I-80");
/// ```
///
/// The `Display` implementation renders the fixed plain-text layout
/// used by dashboard cards. The serde serialization carries
/// `messageType`, `standard`, the structured `data`, and the rendered
/// text as `formatted`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimMessage {
    data: TimData,
}

/// Structured fields of a [`TimMessage`]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimData {
    /// Message id, the event id prefixed "`TIM-`"
    pub message_id: String,

    /// Classified advisory type
    pub event_type: TypeCode,

    /// Normalized severity
    pub severity: Severity,

    /// Route descriptor
    pub route: TimRoute,

    /// Location descriptor
    pub location: TimLocation,

    /// Display content
    pub content: TimContent,

    /// Validity window
    pub validity: TimValidity,
}

/// Route block of a TIM
///
/// Missing fields are already defaulted: "`Unknown Route`" and
/// "`Both Directions`".
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimRoute {
    /// Corridor designation, like "`I-80`"
    pub corridor: String,

    /// Direction of travel affected
    pub direction: String,
}

/// Location block of a TIM
///
/// Coordinates and mile marker pass through exactly as the feed sent
/// them; a TIM does not coerce them to numbers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimLocation {
    /// Free-text location description
    pub description: Option<String>,

    /// Raw latitude
    pub latitude: Option<LooseValue>,

    /// Raw longitude
    pub longitude: Option<LooseValue>,

    /// Raw starting mile marker
    pub mile_marker: Option<LooseValue>,
}

/// Content block of a TIM
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimContent {
    /// Generated headline, "`<event type> on <corridor>`"
    pub headline: String,

    /// Raw event description
    pub description: Option<String>,

    /// Raw lane impact text
    pub lanes_affected: Option<String>,
}

/// Validity block of a TIM
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimValidity {
    /// Derived timing window
    #[serde(flatten)]
    pub timing: TimingInfo,

    /// True when the feed reported no end time
    pub ongoing: bool,
}

impl TimMessage {
    /// The `messageType` discriminator carried by every TIM
    pub const MESSAGE_TYPE: &'static str = "TIM";

    /// The standard this message approximates
    pub const STANDARD: &'static str = "SAE J2735 (simplified)";

    /// Format an event as a TIM
    ///
    /// `now` anchors the derived timing; see
    /// [`TimingInfo::derive()`]. The generated headline uses the
    /// feed's own event type when present and the classified label
    /// when not, so a headline never contains an empty phrase.
    pub fn from_event(event: &EventRecord, now: &DateTime<Utc>) -> Self {
        let event_type = TypeCode::classify(event);
        let severity = Severity::normalize(event);
        let timing = TimingInfo::derive(event, now);

        let corridor = non_empty(event.corridor.as_deref()).unwrap_or(UNKNOWN_ROUTE);
        let direction = non_empty(event.direction.as_deref()).unwrap_or(BOTH_DIRECTIONS);

        let headline = format!(
            "{} on {}",
            non_empty(event.event_type.as_deref()).unwrap_or_else(|| event_type.as_display_str()),
            corridor
        );

        let ongoing = timing.end().is_none();

        TimMessage {
            data: TimData {
                message_id: format!("TIM-{}", event.id),
                event_type,
                severity,
                route: TimRoute {
                    corridor: corridor.to_owned(),
                    direction: direction.to_owned(),
                },
                location: TimLocation {
                    description: event.location.clone(),
                    latitude: event.latitude.clone(),
                    longitude: event.longitude.clone(),
                    mile_marker: event.start_mile_marker.clone(),
                },
                content: TimContent {
                    headline,
                    description: event.description.clone(),
                    lanes_affected: event.lanes_affected.clone(),
                },
                validity: TimValidity { timing, ongoing },
            },
        }
    }

    /// Structured message fields
    pub fn data(&self) -> &TimData {
        &self.data
    }
}

impl fmt::Display for TimMessage {
    /// Fixed-layout plain text rendering
    ///
    /// The line order and blank-line placement are a display
    /// contract; dashboard snapshot tests depend on them.
    ///
    /// ```text
    /// TIM-UT-2024-0042 | Road Work (ROAD_WORK)
    /// Priority 1 | ITIS 1025
    ///
    /// Route: I-80, Westbound
    /// Location: Echo Junction (41.222, -111.046) @ MM 169
    ///
    /// Message: Bridge construction near Echo Junction
    /// Lanes: 2 of 4 lanes closed
    ///
    /// Valid from 2024-01-01T00:00:00Z to 2024-01-01T05:00:00Z (5 hours)
    /// ```
    ///
    /// Missing coordinates render as "`?`", a missing location
    /// description as "`Unknown Location`", missing lanes as
    /// "`Not specified`", and the mile marker segment is omitted
    /// entirely when absent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = &self.data;
        let timing = &data.validity.timing;

        writeln!(
            f,
            "{} | {} ({:#})",
            data.message_id, data.event_type, data.event_type
        )?;
        writeln!(
            f,
            "Priority {} | ITIS {}",
            data.severity.priority(),
            data.event_type.itis_code()
        )?;
        writeln!(f)?;

        writeln!(f, "Route: {}, {}", data.route.corridor, data.route.direction)?;
        write!(
            f,
            "Location: {} ({}, {})",
            data.location
                .description
                .as_deref()
                .unwrap_or(UNKNOWN_LOCATION),
            coordinate(&data.location.latitude),
            coordinate(&data.location.longitude),
        )?;
        if let Some(mile_marker) = &data.location.mile_marker {
            write!(f, " @ MM {}", mile_marker)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        writeln!(
            f,
            "Message: {}",
            data.content
                .description
                .as_deref()
                .unwrap_or(&data.content.headline)
        )?;
        writeln!(
            f,
            "Lanes: {}",
            data.content
                .lanes_affected
                .as_deref()
                .unwrap_or("Not specified")
        )?;
        writeln!(f)?;

        let start = timing.start().to_rfc3339_opts(SecondsFormat::Secs, true);
        match timing.end() {
            Some(end) => write!(
                f,
                "Valid from {} to {} ({})",
                start,
                end.to_rfc3339_opts(SecondsFormat::Secs, true),
                timing.duration_str()
            ),
            None => write!(f, "Valid from {} (ongoing)", start),
        }
    }
}

impl Serialize for TimMessage {
    /// Serializes as the full message envelope:
    /// `{"messageType", "standard", "data", "formatted"}`
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TimMessage", 4)?;
        state.serialize_field("messageType", Self::MESSAGE_TYPE)?;
        state.serialize_field("standard", Self::STANDARD)?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("formatted", &self.to_string())?;
        state.end()
    }
}

// Returns the string only when present and non-empty
fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

// "?" for a missing coordinate
fn coordinate(value: &Option<LooseValue>) -> String {
    value
        .as_ref()
        .map_or_else(|| "?".to_owned(), |v| v.to_string())
}
