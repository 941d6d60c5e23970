//! State border proximity detection
//!
//! Multi-state corridor operators care when an event sits close to a
//! state line: the neighboring state's travelers are affected, and
//! coordination with the neighboring DOT may be required. This module
//! checks an event's coordinates against the [crossing
//! database](crossings) for its corridor and reports the first
//! crossing within a threshold distance.

mod crossings;

pub use crossings::{corridors, crossings, state_code, Crossing};

use std::fmt;

use log::debug;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::event::EventRecord;

/// Default border detection threshold, in miles
pub const DEFAULT_BORDER_THRESHOLD_MILES: f64 = 30.0;

/// Mean Earth radius, in miles
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A detected border proximity
///
/// Produced by [`near_border()`] for events within the threshold
/// distance of a state-line crossing on their corridor.
///
/// ```
/// use timcast::{near_border, EventRecord, DEFAULT_BORDER_THRESHOLD_MILES};
///
/// let mut event = EventRecord::new("UT-2024-0042");
/// event.corridor = Some("I-80".to_owned());
/// event.latitude = Some(41.20.into());
/// event.longitude = Some((-111.0).into());
///
/// let hit = near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES).unwrap();
/// assert_eq!(hit.border_name(), "Evanston");
/// assert_eq!(hit.border_states(), ["UT", "WY"]);
/// assert_eq!(hit.distance_miles(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BorderProximity {
    border_name: &'static str,
    border_states: [&'static str; 2],
    distance_miles: u32,
}

impl BorderProximity {
    /// Name of the nearby crossing
    pub fn border_name(&self) -> &'static str {
        self.border_name
    }

    /// States on either side of the border, in corridor order
    pub fn border_states(&self) -> [&'static str; 2] {
        self.border_states
    }

    /// Distance from the event to the crossing, in whole miles
    pub fn distance_miles(&self) -> u32 {
        self.distance_miles
    }
}

impl fmt::Display for BorderProximity {
    /// Printable summary, like "`Evanston (UT/WY), 3 mi`"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}), {} mi",
            self.border_name, self.border_states[0], self.border_states[1], self.distance_miles
        )
    }
}

impl Serialize for BorderProximity {
    /// Serializes as `{"nearBorder": true, "borderName",
    /// "borderStates", "distanceMiles"}`
    ///
    /// The `nearBorder` marker is always `true`; events away from any
    /// border have no `BorderProximity` at all.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BorderProximity", 4)?;
        state.serialize_field("nearBorder", &true)?;
        state.serialize_field("borderName", self.border_name)?;
        state.serialize_field("borderStates", &self.border_states)?;
        state.serialize_field("distanceMiles", &self.distance_miles)?;
        state.end()
    }
}

/// Detect whether an event is near a state border
///
/// Checks the event's coordinates against every crossing on its
/// corridor, in corridor order, and returns the first crossing within
/// `threshold_miles`. Events with unusable coordinates, no corridor,
/// or a corridor without crossing coverage return `None`; these are
/// never errors.
///
/// The reported distance is rounded to whole miles.
pub fn near_border(event: &EventRecord, threshold_miles: f64) -> Option<BorderProximity> {
    let (lat, lon) = (event.latitude_f64(), event.longitude_f64());
    if lat.is_nan() || lon.is_nan() {
        debug!("event {}: no usable coordinates", event.id);
        return None;
    }

    let corridor = match event.corridor.as_deref().filter(|s| !s.is_empty()) {
        Some(corridor) => corridor,
        None => {
            debug!("event {}: no corridor", event.id);
            return None;
        }
    };

    let table = crossings(corridor);
    if table.is_empty() {
        debug!(
            "event {}: corridor {} has no crossing coverage",
            event.id, corridor
        );
        return None;
    }

    // the first crossing within range wins, in corridor order; a
    // nearer crossing later in the table does not displace it
    for crossing in table {
        let distance = haversine_miles(lat, lon, crossing.lat, crossing.lon);
        if distance <= threshold_miles {
            return Some(BorderProximity {
                border_name: crossing.name,
                border_states: crossing.states,
                distance_miles: distance.round() as u32,
            });
        }
    }

    None
}

/// Events grouped by the border they are near
///
/// Produced by [`group_by_border()`]. Borrows the events it groups.
#[derive(Clone, Debug)]
pub struct BorderGroup<'e> {
    /// Name of the shared crossing
    pub border_name: &'static str,

    /// States on either side of the border
    pub states: [&'static str; 2],

    /// Events near this border, in input order
    pub events: Vec<&'e EventRecord>,
}

/// Group border-proximate events by the border they are near
///
/// Takes `(event, proximity)` pairs, as produced by [`near_border()`],
/// and buckets the events by border name. Groups appear in order of
/// first occurrence, and events keep their input order within each
/// group.
pub fn group_by_border<'e, I>(annotated: I) -> Vec<BorderGroup<'e>>
where
    I: IntoIterator<Item = (&'e EventRecord, BorderProximity)>,
{
    let mut groups: Vec<BorderGroup<'e>> = Vec::new();

    for (event, proximity) in annotated {
        match groups
            .iter_mut()
            .find(|group| group.border_name == proximity.border_name)
        {
            Some(group) => group.events.push(event),
            None => groups.push(BorderGroup {
                border_name: proximity.border_name,
                states: proximity.border_states,
                events: vec![event],
            }),
        }
    }

    groups
}

// great-circle distance on a spherical Earth
fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    fn evanston_event() -> EventRecord {
        let mut event = EventRecord::new("UT-2024-0042");
        event.corridor = Some("I-80".to_owned());
        event.latitude = Some(41.222.into());
        event.longitude = Some((-111.046).into());
        event
    }

    #[test]
    fn test_haversine() {
        // one degree of latitude is about 69.1 miles
        assert_approx_eq!(haversine_miles(40.0, -100.0, 41.0, -100.0), 69.1, 0.05);

        // symmetric, and zero at zero separation
        assert_eq!(
            haversine_miles(40.0, -100.0, 41.0, -101.0),
            haversine_miles(41.0, -101.0, 40.0, -100.0)
        );
        assert_approx_eq!(haversine_miles(41.222, -111.046, 41.222, -111.046), 0.0, 1e-9);
    }

    #[test]
    fn test_exact_hit() {
        let hit = near_border(&evanston_event(), DEFAULT_BORDER_THRESHOLD_MILES)
            .expect("crossing point itself must be a hit");
        assert_eq!(hit.border_name(), "Evanston");
        assert_eq!(hit.border_states(), ["UT", "WY"]);
        assert_eq!(hit.distance_miles(), 0);
        assert_eq!(hit.to_string(), "Evanston (UT/WY), 0 mi");
    }

    #[test]
    fn test_unusable_events() {
        // corridor without coverage
        let mut event = evanston_event();
        event.corridor = Some("I-95".to_owned());
        assert_eq!(near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES), None);

        // no corridor at all, or an empty one
        event.corridor = None;
        assert_eq!(near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES), None);
        event.corridor = Some("".to_owned());
        assert_eq!(near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES), None);

        // missing or non-numeric coordinates
        let mut event = evanston_event();
        event.latitude = None;
        assert_eq!(near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES), None);
        event.latitude = Some("no gps".into());
        assert_eq!(near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES), None);
    }

    #[test]
    fn test_threshold() {
        // about 45 miles east of the Evanston crossing on I-80
        let mut event = evanston_event();
        event.longitude = Some((-110.1812).into());

        assert_eq!(near_border(&event, 30.0), None);

        let hit = near_border(&event, 50.0).expect("within widened threshold");
        assert_eq!(hit.border_name(), "Evanston");
        assert_eq!(hit.distance_miles(), 45);
    }

    #[test]
    fn test_first_match_in_corridor_order() {
        // this point is about 10 mi from Wheeling but under 2 mi from
        // West Alexander; Wheeling comes first in the I-70 table and
        // wins anyway
        let mut event = EventRecord::new("WV-2024-0008");
        event.corridor = Some("I-70".to_owned());
        event.latitude = Some(40.095.into());
        event.longitude = Some((-80.55).into());

        let hit = near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES).expect("border hit");
        assert_eq!(hit.border_name(), "Wheeling");
        assert_eq!(hit.border_states(), ["OH", "WV"]);
        assert_eq!(hit.distance_miles(), 10);
    }

    #[test]
    fn test_corridor_normalization() {
        let mut event = evanston_event();
        event.corridor = Some(" i-80 ".to_owned());
        assert!(near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES).is_some());
    }

    #[test]
    fn test_serialize_shape() {
        let hit = near_border(&evanston_event(), DEFAULT_BORDER_THRESHOLD_MILES).expect("hit");
        let json = serde_json::to_value(hit).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "nearBorder": true,
                "borderName": "Evanston",
                "borderStates": ["UT", "WY"],
                "distanceMiles": 0,
            })
        );
    }

    #[test]
    fn test_group_by_border() {
        let near_evanston = evanston_event();

        let mut near_wendover = EventRecord::new("NV-2024-0191");
        near_wendover.corridor = Some("I-80".to_owned());
        near_wendover.latitude = Some(40.739.into());
        near_wendover.longitude = Some((-114.037).into());

        let mut also_evanston = evanston_event();
        also_evanston.id = "WY-2024-0012".to_owned();

        let annotated: Vec<(&EventRecord, BorderProximity)> =
            [&near_evanston, &near_wendover, &also_evanston]
                .into_iter()
                .map(|event| {
                    (
                        event,
                        near_border(event, DEFAULT_BORDER_THRESHOLD_MILES).expect("border hit"),
                    )
                })
                .collect();

        let groups = group_by_border(annotated);
        assert_eq!(groups.len(), 2);

        // first-occurrence order, input order within each group
        assert_eq!(groups[0].border_name, "Evanston");
        assert_eq!(groups[0].states, ["UT", "WY"]);
        assert_eq!(groups[0].events.len(), 2);
        assert_eq!(groups[0].events[0].id, "UT-2024-0042");
        assert_eq!(groups[0].events[1].id, "WY-2024-0012");

        assert_eq!(groups[1].border_name, "Wendover");
        assert_eq!(groups[1].events.len(), 1);
    }
}
