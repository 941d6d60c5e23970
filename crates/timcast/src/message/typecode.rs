//! Advisory type classification

use std::fmt;

use log::debug;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use strum::{EnumMessage, EnumProperty};

use crate::event::EventRecord;

/// Standardized advisory type for traveler information messages
///
/// Every event classifies to exactly one `TypeCode`. Each code carries
/// a human-readable label, a stable identifier string, and the ITIS
/// phrase number used by traveler information systems.
///
/// | Code               | Label            | ITIS   |
/// |--------------------|------------------|--------|
/// | `ROAD_WORK`        | Road Work        | `1025` |
/// | `ROAD_CLOSURE`     | Road Closure     | `769`  |
/// | `LANE_CLOSURE`     | Lane Closure     | `770`  |
/// | `INCIDENT`         | Incident         | `513`  |
/// | `WEATHER_ALERT`    | Weather Alert    | `4865` |
/// | `TRAFFIC_DELAY`    | Traffic Delay    | `1537` |
/// | `GENERAL_ADVISORY` | General Advisory | `7169` |
///
/// Codes are usually produced by [`classify()`](TypeCode::classify),
/// which keyword-matches the event's type and description fields.
///
/// ```
/// use timcast::{EventRecord, TypeCode};
///
/// let mut event = EventRecord::new("NE-2024-0107");
/// event.description = Some("Bridge construction and lane closure".to_owned());
///
/// // construction outranks the lane closure
/// let code = TypeCode::classify(&event);
/// assert_eq!(code, TypeCode::RoadWork);
/// assert_eq!(code.as_display_str(), "Road Work");
/// assert_eq!(code.as_code_str(), "ROAD_WORK");
/// assert_eq!(code.itis_code(), 1025);
/// ```
///
/// An event that matches no rule is a [General
/// Advisory](TypeCode::GeneralAdvisory); classification never fails.
///
/// ```
/// # use timcast::{EventRecord, TypeCode};
/// let event = EventRecord::new("empty");
/// assert_eq!(TypeCode::classify(&event), TypeCode::GeneralAdvisory);
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumProperty,
    strum_macros::IntoStaticStr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum TypeCode {
    /// Construction, maintenance, or other planned road work
    #[strum(
        serialize = "ROAD_WORK",
        detailed_message = "Road Work",
        props(itis = "1025")
    )]
    RoadWork,

    /// Full closure of the roadway
    #[strum(
        serialize = "ROAD_CLOSURE",
        detailed_message = "Road Closure",
        props(itis = "769")
    )]
    RoadClosure,

    /// One or more lanes closed, road still passable
    #[strum(
        serialize = "LANE_CLOSURE",
        detailed_message = "Lane Closure",
        props(itis = "770")
    )]
    LaneClosure,

    /// Crash or other unplanned incident
    #[strum(
        serialize = "INCIDENT",
        detailed_message = "Incident",
        props(itis = "513")
    )]
    Incident,

    /// Weather-driven hazard
    #[strum(
        serialize = "WEATHER_ALERT",
        detailed_message = "Weather Alert",
        props(itis = "4865")
    )]
    WeatherAlert,

    /// Congestion or slow traffic
    #[strum(
        serialize = "TRAFFIC_DELAY",
        detailed_message = "Traffic Delay",
        props(itis = "1537")
    )]
    TrafficDelay,

    /// Catch-all advisory for events matching no rule
    #[strum(
        serialize = "GENERAL_ADVISORY",
        detailed_message = "General Advisory",
        props(itis = "7169")
    )]
    GeneralAdvisory,
}

// Ordered classification rules, evaluated top to bottom. The first
// rule with any keyword present in the event text wins, so the more
// specific categories must precede the generic ones: construction
// outranks closures, full closures outrank lane closures, and
// incidents outrank the weather that caused them.
static RULES: &[(TypeCode, &[&str])] = &[
    (
        TypeCode::RoadWork,
        &[
            "construction",
            "road work",
            "roadwork",
            "paving",
            "resurfacing",
            "maintenance",
            "bridge work",
        ],
    ),
    (
        TypeCode::RoadClosure,
        &[
            "road closure",
            "road closed",
            "highway closed",
            "interstate closed",
            "full closure",
            "shut down",
            "impassable",
        ],
    ),
    (
        TypeCode::LaneClosure,
        &[
            "lane closure",
            "lane closed",
            "lanes closed",
            "lane blocked",
            "lanes blocked",
            "lane restriction",
        ],
    ),
    (
        TypeCode::Incident,
        &[
            "incident",
            "accident",
            "crash",
            "collision",
            "wreck",
            "overturned",
            "disabled vehicle",
        ],
    ),
    (
        TypeCode::WeatherAlert,
        &[
            "weather",
            "snow",
            "icy",
            "slick",
            "black ice",
            "fog",
            "flood",
            "high wind",
            "winter storm",
        ],
    ),
    (
        TypeCode::TrafficDelay,
        &["delay", "congestion", "slow", "backup", "heavy traffic"],
    ),
];

impl TypeCode {
    /// Classify an event record
    ///
    /// Performs a case-insensitive substring match of the event's
    /// type and description against an ordered rule list. The first
    /// matching rule wins; there is no combination logic. Events
    /// matching no rule classify as
    /// [`GeneralAdvisory`](TypeCode::GeneralAdvisory).
    pub fn classify(event: &EventRecord) -> TypeCode {
        let text = event.searchable_text();
        for (code, keywords) in RULES {
            if keywords.iter().any(|kw| text.contains(kw)) {
                return *code;
            }
        }

        debug!("event {}: no type rule matched", event.id);
        TypeCode::default()
    }

    /// Human-readable string representation
    ///
    /// Converts to a human-readable string, like "`Road Work`."
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message()
            .expect("missing human-readable definition")
    }

    /// Code identifier string
    ///
    /// Returns the stable identifier for this `TypeCode`, like
    /// "`ROAD_WORK`."
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// ITIS phrase number
    ///
    /// The numeric code from the ITIS phrase dictionary that best
    /// matches this advisory type.
    pub fn itis_code(&self) -> u16 {
        self.get_str("itis")
            .and_then(|s| s.parse().ok())
            .expect("missing ITIS definition")
    }
}

impl std::default::Default for TypeCode {
    fn default() -> Self {
        TypeCode::GeneralAdvisory
    }
}

impl AsRef<str> for TypeCode {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

impl fmt::Display for TypeCode {
    /// Printable string
    ///
    /// * The normal form is a human-readable label like "`Road Work`"
    /// * The alternate form is the identifier like "`ROAD_WORK`"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

impl Serialize for TypeCode {
    /// Serializes as the structured object consumed by displays:
    /// `{"type": label, "code": identifier, "itisNumber": number}`
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TypeCode", 3)?;
        state.serialize_field("type", self.as_display_str())?;
        state.serialize_field("code", self.as_code_str())?;
        state.serialize_field("itisNumber", &self.itis_code())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use strum::IntoEnumIterator;

    fn described(text: &str) -> EventRecord {
        let mut event = EventRecord::new("test");
        event.description = Some(text.to_owned());
        event
    }

    #[test]
    fn test_rule_priority() {
        // construction beats the lane closure it causes
        assert_eq!(
            TypeCode::RoadWork,
            TypeCode::classify(&described("Bridge construction and lane closure"))
        );

        // a full closure beats the crash that caused it
        assert_eq!(
            TypeCode::RoadClosure,
            TypeCode::classify(&described("Road closed following multi-vehicle crash"))
        );

        // a lane closure beats the crash that caused it
        assert_eq!(
            TypeCode::LaneClosure,
            TypeCode::classify(&described("Vehicle crash, left lane closed"))
        );
    }

    #[test]
    fn test_each_category() {
        assert_eq!(
            TypeCode::RoadWork,
            TypeCode::classify(&described("Paving operations near MM 12"))
        );
        assert_eq!(
            TypeCode::RoadClosure,
            TypeCode::classify(&described("Interstate closed in both directions"))
        );
        assert_eq!(
            TypeCode::LaneClosure,
            TypeCode::classify(&described("Right two lanes blocked"))
        );
        assert_eq!(
            TypeCode::Incident,
            TypeCode::classify(&described("Jackknifed semi, overturned trailer"))
        );
        assert_eq!(
            TypeCode::WeatherAlert,
            TypeCode::classify(&described("Black ice reported on bridges"))
        );
        assert_eq!(
            TypeCode::TrafficDelay,
            TypeCode::classify(&described("Heavy congestion approaching exit 110"))
        );
        assert_eq!(
            TypeCode::GeneralAdvisory,
            TypeCode::classify(&described("Mattress in roadway"))
        );
    }

    #[test]
    fn test_event_type_field_is_matched() {
        let mut event = EventRecord::new("test");
        event.event_type = Some("CONSTRUCTION".to_owned());
        assert_eq!(TypeCode::RoadWork, TypeCode::classify(&event));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!("Lane Closure", format!("{}", TypeCode::LaneClosure));
        assert_eq!("LANE_CLOSURE", format!("{:#}", TypeCode::LaneClosure));
        assert_eq!("GENERAL_ADVISORY", TypeCode::default().as_code_str());
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(TypeCode::Incident).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Incident",
                "code": "INCIDENT",
                "itisNumber": 513,
            })
        );
    }

    #[test]
    fn test_type_code_completeness() {
        let mut code_set = std::collections::HashSet::new();
        let mut name_set = std::collections::HashSet::new();

        for code in TypeCode::iter() {
            // code and label assignments must be unique
            let id: &str = code.into();
            assert!(code_set.insert(id.to_owned()));
            assert!(name_set.insert(code.as_display_str().to_owned()));

            // identifier converts back
            let cmp = TypeCode::from_str(id).expect("can't back-convert type code!");
            assert_eq!(cmp, code);

            // ITIS lookup does not panic
            let _ = code.itis_code();
        }

        // every rule names a code that is not the default
        for (code, keywords) in RULES {
            assert_ne!(TypeCode::GeneralAdvisory, *code);
            assert!(!keywords.is_empty());
            for kw in keywords.iter() {
                assert_eq!(kw.to_lowercase(), *kw, "keywords must be lowercase");
            }
        }
    }
}
