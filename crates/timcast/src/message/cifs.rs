//! Incident feed message formatting

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use strum::EnumMessage;

use crate::event::EventRecord;

use super::severity::Severity;
use super::timing::TimingInfo;

/// CIFS top-level incident type
///
/// The coarse taxonomy of the incident feed standard. Compare
/// [`TypeCode`](crate::TypeCode): the two target standards bucket
/// the same events differently, and the two classification passes
/// are deliberately independent.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum CifsType {
    /// Crash, stall, or other unplanned incident
    #[strum(serialize = "INCIDENT", detailed_message = "Incident")]
    Incident,

    /// Planned construction or maintenance
    #[strum(serialize = "CONSTRUCTION", detailed_message = "Construction")]
    Construction,

    /// Roadway closure
    #[strum(serialize = "CLOSURE", detailed_message = "Closure")]
    Closure,

    /// Weather-driven hazard
    #[strum(serialize = "WEATHER", detailed_message = "Weather")]
    Weather,

    /// Catch-all for events matching no rule
    #[strum(serialize = "EVENT", detailed_message = "Event")]
    Event,
}

/// CIFS incident subtype
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum CifsSubtype {
    /// Collision between vehicles or with an obstacle
    #[strum(serialize = "ACCIDENT", detailed_message = "Accident")]
    Accident,

    /// Stalled or disabled vehicle
    #[strum(serialize = "DISABLED_VEHICLE", detailed_message = "Disabled Vehicle")]
    DisabledVehicle,

    /// Road work of any kind
    #[strum(serialize = "ROAD_WORK", detailed_message = "Road Work")]
    RoadWork,

    /// Road closed to traffic
    #[strum(serialize = "ROAD_CLOSED", detailed_message = "Road Closed")]
    RoadClosed,

    /// Hazardous driving conditions
    #[strum(
        serialize = "HAZARDOUS_CONDITIONS",
        detailed_message = "Hazardous Conditions"
    )]
    HazardousConditions,

    /// Unclassified
    #[strum(serialize = "OTHER", detailed_message = "Other")]
    Other,
}

// CIFS keyword vocabulary. Incidents are tested first: a crash that
// closed a lane is an INCIDENT to an incident feed, whatever the TIM
// pass decides. Closure terms are deliberately broad since closures
// rank below incidents and construction here.
static INCIDENT_KEYWORDS: &[&str] = &[
    "accident",
    "crash",
    "collision",
    "incident",
    "wreck",
    "overturned",
    "disabled",
    "stalled",
];
static DISABLED_KEYWORDS: &[&str] = &["disabled", "stalled"];
static CONSTRUCTION_KEYWORDS: &[&str] = &[
    "construction",
    "road work",
    "roadwork",
    "maintenance",
    "paving",
];
static CLOSURE_KEYWORDS: &[&str] = &["closed", "closure"];
static WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "snow",
    "icy",
    "slick",
    "black ice",
    "fog",
    "flood",
    "high wind",
    "winter storm",
    "freezing",
];

/// CIFS category: type and subtype
///
/// Represents one slot in the incident feed taxonomy, like
/// `INCIDENT/ACCIDENT` or `CONSTRUCTION/ROAD_WORK`. Usually
/// constructed with [`classify()`](CifsCategory::classify).
///
/// ```
/// use timcast::{CifsCategory, CifsSubtype, CifsType, EventRecord};
///
/// let mut event = EventRecord::new("NE-2024-0107");
/// event.description = Some("Stalled vehicle on the shoulder".to_owned());
///
/// let category = CifsCategory::classify(&event);
/// assert_eq!(category.kind(), CifsType::Incident);
/// assert_eq!(category.subtype(), CifsSubtype::DisabledVehicle);
/// ```
///
/// The `Display` representation is human-readable; the alternate form
/// is the code pair.
///
/// ```
/// # use timcast::{CifsCategory, EventRecord};
/// # let mut event = EventRecord::new("NE-2024-0107");
/// # event.description = Some("Stalled vehicle on the shoulder".to_owned());
/// # let category = CifsCategory::classify(&event);
/// assert_eq!(category.to_string(), "Incident (Disabled Vehicle)");
/// assert_eq!(format!("{:#}", category), "INCIDENT/DISABLED_VEHICLE");
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct CifsCategory {
    kind: CifsType,
    subtype: CifsSubtype,
}

impl CifsCategory {
    /// Classify an event for the incident feed
    ///
    /// A keyword pass over the event's type and description,
    /// independent of [`TypeCode::classify()`](crate::TypeCode::classify)
    /// and with a different rule order: incidents first, then
    /// construction, closures, and weather. The two passes may
    /// disagree about the same event; each encodes its own downstream
    /// standard. Events matching no rule are `EVENT/OTHER`.
    pub fn classify(event: &EventRecord) -> Self {
        let text = event.searchable_text();

        if contains_any(&text, INCIDENT_KEYWORDS) {
            let subtype = if contains_any(&text, DISABLED_KEYWORDS) {
                CifsSubtype::DisabledVehicle
            } else {
                CifsSubtype::Accident
            };
            return CifsCategory {
                kind: CifsType::Incident,
                subtype,
            };
        }

        if contains_any(&text, CONSTRUCTION_KEYWORDS) {
            return CifsCategory {
                kind: CifsType::Construction,
                subtype: CifsSubtype::RoadWork,
            };
        }

        if contains_any(&text, CLOSURE_KEYWORDS) {
            return CifsCategory {
                kind: CifsType::Closure,
                subtype: CifsSubtype::RoadClosed,
            };
        }

        if contains_any(&text, WEATHER_KEYWORDS) {
            return CifsCategory {
                kind: CifsType::Weather,
                subtype: CifsSubtype::HazardousConditions,
            };
        }

        debug!("event {}: no incident rule matched", event.id);
        Self::default()
    }

    /// Top-level incident type
    pub fn kind(&self) -> CifsType {
        self.kind
    }

    /// Incident subtype
    pub fn subtype(&self) -> CifsSubtype {
        self.subtype
    }
}

impl std::default::Default for CifsCategory {
    /// The catch-all category, `EVENT/OTHER`
    fn default() -> Self {
        CifsCategory {
            kind: CifsType::Event,
            subtype: CifsSubtype::Other,
        }
    }
}

impl fmt::Display for CifsCategory {
    /// Printable string
    ///
    /// * The normal form is human-readable, like
    ///   "`Incident (Accident)`"
    /// * The alternate form is the code pair, like
    ///   "`INCIDENT/ACCIDENT`"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(
                f,
                "{}/{}",
                self.kind.get_serializations()[0],
                self.subtype.get_serializations()[0]
            )
        } else {
            write!(
                f,
                "{} ({})",
                self.kind.get_detailed_message().expect("missing definition"),
                self.subtype
                    .get_detailed_message()
                    .expect("missing definition")
            )
        }
    }
}

impl Serialize for CifsCategory {
    /// Serializes as `{"type": code, "subtype": code}`
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CifsCategory", 2)?;
        state.serialize_field("type", self.kind.get_serializations()[0])?;
        state.serialize_field("subtype", self.subtype.get_serializations()[0])?;
        state.end()
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Parsed lane impact
///
/// Free-text lane descriptions usually follow the "`2 of 4 lanes
/// closed`" convention; when they do, the first two integers are the
/// blocked and total lane counts. Anything else is preserved as text.
/// Callers must handle both shapes.
///
/// ```
/// use timcast::LaneImpact;
///
/// assert_eq!(
///     LaneImpact::parse("2 of 4 lanes closed"),
///     LaneImpact::Counted { blocked: 2, total: 4 }
/// );
/// assert_eq!(
///     LaneImpact::parse("ramp closed"),
///     LaneImpact::Text("ramp closed".to_owned())
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LaneImpact {
    /// Counted impact: `blocked` of `total` lanes
    Counted {
        /// Lanes blocked
        blocked: u32,
        /// Lanes in the affected direction
        total: u32,
    },

    /// Unparseable impact, original text preserved
    Text(String),
}

impl LaneImpact {
    /// Parse free lane-impact text
    ///
    /// Extracts the first two integers anywhere in the text as
    /// `blocked` and `total`. Text without two integers, or with
    /// counts too large to parse, falls back to
    /// [`Text`](LaneImpact::Text) with the input preserved.
    pub fn parse<S>(text: S) -> Self
    where
        S: AsRef<str>,
    {
        lazy_static! {
            static ref INTEGER: Regex = Regex::new(r"[0-9]+").expect("bad lane regexp");
        }

        let text = text.as_ref();
        let mut integers = INTEGER.find_iter(text);
        match (integers.next(), integers.next()) {
            (Some(first), Some(second)) => {
                match (first.as_str().parse(), second.as_str().parse()) {
                    (Ok(blocked), Ok(total)) => LaneImpact::Counted { blocked, total },
                    _ => LaneImpact::Text(text.to_owned()),
                }
            }
            _ => LaneImpact::Text(text.to_owned()),
        }
    }
}

impl fmt::Display for LaneImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneImpact::Counted { blocked, total } => {
                write!(f, "{} of {} lanes blocked", blocked, total)
            }
            LaneImpact::Text(text) => text.fmt(f),
        }
    }
}

impl Serialize for LaneImpact {
    /// Serializes counted impacts as `{"blocked", "total"}` and
    /// unparsed impacts as
    /// `{"blocked": null, "total": null, "description"}`
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            LaneImpact::Counted { blocked, total } => {
                let mut state = serializer.serialize_struct("LaneImpact", 2)?;
                state.serialize_field("blocked", blocked)?;
                state.serialize_field("total", total)?;
                state.end()
            }
            LaneImpact::Text(text) => {
                let mut state = serializer.serialize_struct("LaneImpact", 3)?;
                state.serialize_field("blocked", &None::<u32>)?;
                state.serialize_field("total", &None::<u32>)?;
                state.serialize_field("description", text)?;
                state.end()
            }
        }
    }
}

/// An incident feed message
///
/// A display-oriented approximation of a Waze CIFS incident record:
/// the [category](CifsCategory) from the incident-feed classification
/// pass, the normalized severity in CIFS vocabulary, a derived
/// lifecycle status, coerced coordinates, and parsed lane impact.
/// Constructed with [`from_event()`](CifsMessage::from_event), which
/// never fails.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timcast::{CifsMessage, EventRecord};
///
/// let mut event = EventRecord::new("NE-2024-0107");
/// event.description = Some("Multi-vehicle crash".to_owned());
/// event.latitude = Some("41.25".into());
/// event.longitude = Some((-95.93).into());
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
/// let cifs = CifsMessage::from_event(&event, &now);
///
/// assert_eq!(cifs.data().status, "ACTIVE");
/// assert_eq!(cifs.data().location.latitude, 41.25);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CifsMessage {
    data: CifsData,
}

/// Structured fields of a [`CifsMessage`]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CifsData {
    /// Event id, unprefixed
    pub id: String,

    /// Incident feed category
    #[serde(flatten)]
    pub category: CifsCategory,

    /// Normalized severity, serialized in CIFS vocabulary
    #[serde(serialize_with = "cifs_level")]
    pub severity: Severity,

    /// Lifecycle status: "`CLOSED`" once the end time passes, else
    /// the feed's own status upper-cased, else "`ACTIVE`"
    pub status: String,

    /// Coerced location
    pub location: CifsLocation,

    /// Parsed lane impact, when the feed reported one
    pub lanes: Option<LaneImpact>,

    /// Raw event description
    pub description: Option<String>,

    /// Start of the validity window
    pub start_time: DateTime<Utc>,

    /// End of the validity window, when reported
    pub end_time: Option<DateTime<Utc>>,
}

/// Location block of a CIFS message
///
/// Coordinates are coerced with
/// [`LooseValue::as_f64()`](crate::LooseValue::as_f64); `NaN` means
/// "unknown location," never an error, and serializes as `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CifsLocation {
    /// Coerced latitude, `NaN` when unknown
    pub latitude: f64,

    /// Coerced longitude, `NaN` when unknown
    pub longitude: f64,

    /// Free-text location description
    pub description: Option<String>,
}

impl CifsMessage {
    /// The `messageType` discriminator carried by every CIFS message
    pub const MESSAGE_TYPE: &'static str = "CIFS";

    /// The standard this message approximates
    pub const STANDARD: &'static str = "Waze CIFS (simplified)";

    /// Format an event as a CIFS incident message
    ///
    /// `now` anchors the derived timing and the lifecycle status: an
    /// end time strictly before `now` forces status "`CLOSED`"
    /// regardless of what the feed's status field says.
    pub fn from_event(event: &EventRecord, now: &DateTime<Utc>) -> Self {
        let category = CifsCategory::classify(event);
        let severity = Severity::normalize(event);
        let timing = TimingInfo::derive(event, now);

        CifsMessage {
            data: CifsData {
                id: event.id.clone(),
                category,
                severity,
                status: derive_status(event, &timing, now),
                location: CifsLocation {
                    latitude: event.latitude_f64(),
                    longitude: event.longitude_f64(),
                    description: event.location.clone(),
                },
                lanes: event.lanes_affected.as_deref().map(LaneImpact::parse),
                description: event.description.clone(),
                start_time: timing.start(),
                end_time: timing.end(),
            },
        }
    }

    /// Structured message fields
    pub fn data(&self) -> &CifsData {
        &self.data
    }
}

// A past end time always reads CLOSED. Otherwise the feed's own
// status word is taken at its word, upper-cased; feeds that say
// nothing are ACTIVE.
fn derive_status(event: &EventRecord, timing: &TimingInfo, now: &DateTime<Utc>) -> String {
    if timing.end().map_or(false, |end| end < *now) {
        return "CLOSED".to_owned();
    }

    match event.status.as_deref().filter(|s| !s.is_empty()) {
        Some(status) => status.to_uppercase(),
        None => "ACTIVE".to_owned(),
    }
}

impl fmt::Display for CifsMessage {
    /// Fixed-layout plain text rendering
    ///
    /// ```text
    /// CIFS NE-2024-0107 | INCIDENT/ACCIDENT [MAJOR]
    /// Status: ACTIVE
    /// Location: 41.25, -95.93 (Near the Gretna interchange)
    /// Lanes: 2 of 4 lanes blocked
    /// From 2024-01-15T06:00:00Z (no end reported)
    /// ```
    ///
    /// Unknown coordinates render as "`unknown`", and the lanes line
    /// is omitted when the feed reported no lane impact.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = &self.data;

        writeln!(
            f,
            "CIFS {} | {:#} [{}]",
            data.id,
            data.category,
            data.severity.as_cifs_str()
        )?;
        writeln!(f, "Status: {}", data.status)?;

        write!(f, "Location: ")?;
        if data.location.latitude.is_nan() || data.location.longitude.is_nan() {
            write!(f, "unknown")?;
        } else {
            write!(f, "{}, {}", data.location.latitude, data.location.longitude)?;
        }
        match &data.location.description {
            Some(description) => writeln!(f, " ({})", description)?,
            None => writeln!(f)?,
        }

        if let Some(lanes) = &data.lanes {
            writeln!(f, "Lanes: {}", lanes)?;
        }

        let start = data.start_time.to_rfc3339_opts(SecondsFormat::Secs, true);
        match data.end_time {
            Some(end) => write!(
                f,
                "From {} until {}",
                start,
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => write!(f, "From {} (no end reported)", start),
        }
    }
}

impl Serialize for CifsMessage {
    /// Serializes as the full message envelope:
    /// `{"messageType", "standard", "data", "formatted"}`
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CifsMessage", 4)?;
        state.serialize_field("messageType", Self::MESSAGE_TYPE)?;
        state.serialize_field("standard", Self::STANDARD)?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("formatted", &self.to_string())?;
        state.end()
    }
}

fn cifs_level<S>(severity: &Severity, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(severity.as_cifs_str())
}
