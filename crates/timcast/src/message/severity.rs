//! Severity normalization

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use strum::{EnumMessage, EnumProperty};

use crate::event::EventRecord;

/// Normalized event severity
///
/// State feeds report severity in at least three vocabularies:
/// free-text levels ("`HIGH`", "`Major incident`"), numeric
/// priorities, and the CIFS `MAJOR`/`MODERATE`/`MINOR` scale.
/// `Severity` is the common denominator. Each level carries a
/// numeric display priority (1 is most urgent), its CIFS name,
/// and a color hint for dashboard rendering.
///
/// ```
/// use timcast::Severity;
///
/// assert_eq!(Severity::High.priority(), 1);
/// assert_eq!(Severity::High.as_cifs_str(), "MAJOR");
/// assert_eq!("High", format!("{}", Severity::High));
/// assert_eq!("HIGH", format!("{:#}", Severity::High));
/// ```
///
/// Severities are `Ord`. Higher severities compare greater, so the
/// most urgent events sort last in ascending order.
///
/// ```
/// # use timcast::Severity;
/// assert!(Severity::Low < Severity::Medium);
/// assert!(Severity::Medium < Severity::High);
/// ```
///
/// The default is [`Low`](Severity::Low): an event that reports no
/// recognizable severity must never escalate above events that do.
///
/// ```
/// # use timcast::{EventRecord, Severity};
/// assert_eq!(Severity::normalize(&EventRecord::new("x")), Severity::Low);
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumProperty,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum Severity {
    /// Routine advisory severity, the fail-safe default
    #[strum(
        serialize = "LOW",
        detailed_message = "Low",
        props(cifs = "MINOR", color = "#388e3c")
    )]
    Low,

    /// Notable impact on travel
    #[strum(
        serialize = "MEDIUM",
        detailed_message = "Medium",
        props(cifs = "MODERATE", color = "#f57c00")
    )]
    Medium,

    /// Major impact on travel
    #[strum(
        serialize = "HIGH",
        detailed_message = "High",
        props(cifs = "MAJOR", color = "#d32f2f")
    )]
    High,
}

impl Severity {
    /// Normalize an event's reported severity
    ///
    /// Reads the `severity` field, or `severityLevel` when `severity`
    /// is absent or empty; the first non-empty value wins. The text is
    /// then matched with [`from_text()`](Severity::from_text). Events
    /// reporting neither field are [`Low`](Severity::Low).
    pub fn normalize(event: &EventRecord) -> Self {
        let text = event
            .severity
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| event.severity_level.as_deref().filter(|s| !s.is_empty()));

        match text {
            Some(text) => Self::from_text(text),
            None => Self::default(),
        }
    }

    /// Interpret free-text severity
    ///
    /// Case-insensitive substring match: text mentioning "high" or
    /// "major" is [`High`](Severity::High), "medium" or "moderate" is
    /// [`Medium`](Severity::Medium), and anything else is
    /// [`Low`](Severity::Low). Unrecognized vocabularies deliberately
    /// land on `Low` rather than guessing upward.
    pub fn from_text<S>(text: S) -> Self
    where
        S: AsRef<str>,
    {
        let text = text.as_ref().to_lowercase();
        if text.contains("high") || text.contains("major") {
            Severity::High
        } else if text.contains("medium") || text.contains("moderate") {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Numeric display priority, 1 (most urgent) to 3
    pub fn priority(&self) -> u8 {
        match self {
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }

    /// Human-readable string representation
    ///
    /// Converts to a human-readable string, like "`High`."
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Identifier string representation, like "`HIGH`"
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// CIFS severity vocabulary, like "`MAJOR`"
    pub fn as_cifs_str(&self) -> &'static str {
        self.get_str("cifs").expect("missing CIFS definition")
    }

    /// Display color hint, as a hex string
    pub fn color(&self) -> &'static str {
        self.get_str("color").expect("missing color definition")
    }
}

impl std::default::Default for Severity {
    fn default() -> Self {
        Severity::Low
    }
}

impl AsRef<str> for Severity {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

impl fmt::Display for Severity {
    /// Printable string
    ///
    /// * The normal form is a human-readable string like "`High`"
    /// * The alternate form is the identifier like "`HIGH`"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

impl Serialize for Severity {
    /// Serializes as the structured object consumed by displays:
    /// `{"level", "priority", "cifsLevel", "color"}`
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Severity", 4)?;
        state.serialize_field("level", self.as_display_str())?;
        state.serialize_field("priority", &self.priority())?;
        state.serialize_field("cifsLevel", self.as_cifs_str())?;
        state.serialize_field("color", self.color())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use strum::IntoEnumIterator;

    #[test]
    fn test_normalize() {
        let mut event = EventRecord::new("test");
        assert_eq!(Severity::Low, Severity::normalize(&event));

        event.severity = Some("HIGH".to_owned());
        assert_eq!(Severity::High, Severity::normalize(&event));

        // substring matching tolerates surrounding prose
        event.severity = Some("Major incident".to_owned());
        assert_eq!(Severity::High, Severity::normalize(&event));

        // empty severity falls through to severityLevel
        event.severity = Some(String::new());
        event.severity_level = Some("moderate".to_owned());
        assert_eq!(Severity::Medium, Severity::normalize(&event));

        // severity wins over severityLevel when both are present
        event.severity = Some("low".to_owned());
        assert_eq!(Severity::Low, Severity::normalize(&event));

        // unrecognized vocabulary does not escalate
        event.severity = Some("critical".to_owned());
        event.severity_level = None;
        assert_eq!(Severity::Low, Severity::normalize(&event));
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert_eq!(Severity::default(), Severity::Low);
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(Severity::High).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "level": "High",
                "priority": 1,
                "cifsLevel": "MAJOR",
                "color": "#d32f2f",
            })
        );
    }

    #[test]
    fn test_severity_completeness() {
        for severity in Severity::iter() {
            // all metadata lookups must be defined
            let _ = severity.as_display_str();
            let _ = severity.as_cifs_str();
            let _ = severity.color();
            assert!((1..=3).contains(&severity.priority()));

            // identifier converts back
            let cmp = Severity::from_str(severity.as_code_str()).expect("bad severity code");
            assert_eq!(cmp, severity);
        }

        // priorities are unique and inverted with respect to Ord
        assert_eq!(Severity::High.priority(), 1);
        assert_eq!(Severity::Medium.priority(), 2);
        assert_eq!(Severity::Low.priority(), 3);
    }
}
