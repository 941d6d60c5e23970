//! Loosely-typed traffic event records

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A traffic event as ingested from a state DOT feed
///
/// Feeds disagree about almost everything: which fields are present,
/// whether coordinates are numbers or strings, and which of several
/// severity vocabularies is in use. `EventRecord` models the least
/// common denominator: an identifying [`id`](EventRecord::id) and a
/// bag of optional fields. Every derivation in this crate tolerates
/// the absence of any optional field.
///
/// Records deserialize from camelCase feed JSON.
///
/// ```
/// use timcast::EventRecord;
///
/// let event: EventRecord = serde_json::from_str(
///     r#"{"id": "NE-2024-0107",
///         "eventType": "Crash",
///         "corridor": "I-80",
///         "latitude": "41.25",
///         "longitude": -95.93}"#,
/// )
/// .expect("feed record");
///
/// assert_eq!(event.id, "NE-2024-0107");
/// assert_eq!(event.latitude_f64(), 41.25);
/// assert_eq!(event.longitude_f64(), -95.93);
/// ```
///
/// Records may also be built programmatically, starting from
/// [`EventRecord::new()`] and filling in whatever fields are known.
///
/// ```
/// use timcast::EventRecord;
///
/// let mut event = EventRecord::new("UT-2024-0042");
/// event.description = Some("Bridge construction near Echo Junction".to_owned());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Identifying key, the only required field
    pub id: String,

    /// Free-text event type, like "`Crash`" or "`Construction`"
    pub event_type: Option<String>,

    /// Free-text description of the event
    pub description: Option<String>,

    /// Severity in the feed's own vocabulary, like "`HIGH`" or "`Major`"
    pub severity: Option<String>,

    /// Alternate severity field used by some feeds
    pub severity_level: Option<String>,

    /// Reporting state, as a two-letter code or full name
    pub state: Option<String>,

    /// Corridor designation, like "`I-80`"
    pub corridor: Option<String>,

    /// Direction of travel affected
    pub direction: Option<String>,

    /// Free-text location description
    pub location: Option<String>,

    /// Latitude, number or string depending on the feed
    pub latitude: Option<LooseValue>,

    /// Longitude, number or string depending on the feed
    pub longitude: Option<LooseValue>,

    /// Mile marker at the start of the event
    pub start_mile_marker: Option<LooseValue>,

    /// Free-text lane impact, like "`2 of 4 lanes closed`"
    pub lanes_affected: Option<String>,

    /// Event start timestamp, in one of the feed formats
    pub start_time: Option<String>,

    /// Event end timestamp, if the feed reports one
    pub end_time: Option<String>,

    /// Originating feed or agency
    pub source: Option<String>,

    /// Feed-reported status, like "`active`" or "`planned`"
    pub status: Option<String>,

    /// Whether the event has been human-verified
    pub verified: Option<bool>,

    /// Feed-reported last update timestamp
    pub last_updated: Option<String>,
}

impl EventRecord {
    /// New record with the given `id` and no other fields
    pub fn new<S>(id: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Coerced numeric latitude
    ///
    /// Applies [`LooseValue::as_f64()`] to the raw field. Returns
    /// `NaN` when the field is absent or has no numeric prefix;
    /// `NaN` means "unknown location," never an error.
    pub fn latitude_f64(&self) -> f64 {
        self.latitude.as_ref().map_or(f64::NAN, LooseValue::as_f64)
    }

    /// Coerced numeric longitude
    ///
    /// See [`latitude_f64()`](EventRecord::latitude_f64).
    pub fn longitude_f64(&self) -> f64 {
        self.longitude.as_ref().map_or(f64::NAN, LooseValue::as_f64)
    }

    /// Two-letter code for the reporting state, if recognized
    ///
    /// ```
    /// use timcast::EventRecord;
    ///
    /// let mut event = EventRecord::new("1");
    /// event.state = Some("Nebraska".to_owned());
    /// assert_eq!(event.state_code(), Some("NE".to_owned()));
    /// ```
    pub fn state_code(&self) -> Option<String> {
        crate::border::state_code(self.state.as_deref()?)
    }

    // Lowercased classification text: event type and description,
    // space-joined. Both keyword passes match against this.
    pub(crate) fn searchable_text(&self) -> String {
        format!(
            "{} {}",
            self.event_type.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }
}

/// A feed field that may arrive as number or string
///
/// State feeds encode coordinates and mile markers inconsistently:
/// `41.25` in one feed is `"41.25"` (or `"41.25 mi"`) in the next.
/// `LooseValue` preserves exactly what the feed sent and defers
/// numeric interpretation to [`as_f64()`](LooseValue::as_f64).
///
/// ```
/// use timcast::LooseValue;
///
/// assert_eq!(LooseValue::from(41.25).as_f64(), 41.25);
/// assert_eq!(LooseValue::from("41.25").as_f64(), 41.25);
/// assert_eq!(LooseValue::from("271.4 mi").as_f64(), 271.4);
/// assert!(LooseValue::from("milepost").as_f64().is_nan());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    /// A JSON number
    Number(f64),

    /// A JSON string, numeric or otherwise
    Text(String),
}

impl LooseValue {
    /// Numeric interpretation, `NaN` when there is none
    ///
    /// Numbers pass through unchanged. Text is read for its longest
    /// leading numeric prefix after skipping whitespace, so units and
    /// other trailing annotations are tolerated. Text without a
    /// numeric prefix yields `NaN`.
    pub fn as_f64(&self) -> f64 {
        lazy_static! {
            static ref LEADING_FLOAT: Regex =
                Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
                    .expect("bad float regexp");
        }

        match self {
            LooseValue::Number(n) => *n,
            LooseValue::Text(s) => LEADING_FLOAT
                .find(s.trim_start())
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(f64::NAN),
        }
    }
}

impl From<f64> for LooseValue {
    fn from(n: f64) -> Self {
        LooseValue::Number(n)
    }
}

impl From<&str> for LooseValue {
    fn from(s: &str) -> Self {
        LooseValue::Text(s.to_owned())
    }
}

impl From<String> for LooseValue {
    fn from(s: String) -> Self {
        LooseValue::Text(s)
    }
}

impl fmt::Display for LooseValue {
    /// Prints the value as the feed sent it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseValue::Number(n) => n.fmt(f),
            LooseValue::Text(s) => s.fmt(f),
        }
    }
}
