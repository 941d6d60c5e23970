//! # Interstate state-line crossing database
//!
//! | Corridor | Crossings | States traversed                          |
//! |----------|-----------|-------------------------------------------|
//! | `I-80`   | 10        | CA NV UT WY NE IA IL IN OH PA NJ          |
//! | `I-35`   | 4         | MN IA MO KS OK                            |
//! | `I-70`   | 8         | UT CO KS MO IL IN OH WV PA                |
//! | `I-90`   | 7         | SD MN WI IL IN OH PA NY                   |
//! | `I-94`   | 5         | ND MN WI IL IN MI                         |
//!
//! Each crossing marks the approximate point where the corridor
//! centerline meets a state line, named for the nearest town or
//! landmark. Coordinates are for proximity detection, not
//! navigation.
//!
//! ## See Also
//!
//! * [`near_border()`](crate::near_border)
//! * [`crossings()`]

use phf::phf_map;

/// A state-line crossing on an interstate corridor
///
/// The two [`states`](Crossing::states) are given in corridor order,
/// west-to-east or north-to-south, so consecutive crossings on the
/// same corridor share a state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    /// Crossing name, usually the nearest town or landmark
    pub name: &'static str,

    /// States on either side of the line, in corridor order
    pub states: [&'static str; 2],

    /// Latitude, decimal degrees north
    pub lat: f64,

    /// Longitude, decimal degrees east
    pub lon: f64,
}

/// Corridors with crossing coverage
///
/// Returns the designators accepted by [`crossings()`], in no
/// particular order.
pub fn corridors() -> &'static [&'static str] {
    CORRIDORS
}

/// State-line crossings for a corridor
///
/// The `corridor` designator is matched case-insensitively and with
/// surrounding whitespace ignored, so "` i-80 `" finds `I-80`.
/// Corridors without coverage return an empty slice.
pub fn crossings(corridor: &str) -> &'static [Crossing] {
    CROSSINGS
        .get(corridor.trim().to_uppercase().as_str())
        .copied()
        .unwrap_or(&[])
}

/// Normalize a state to its two-letter postal code
///
/// Accepts either a two-letter code in any case ("`ut`" → "`UT`") or
/// the full name of a state touched by a covered corridor
/// ("`Utah`" → "`UT`"). Unrecognized names return `None`. Two-letter
/// inputs are upper-cased without validation.
pub fn state_code(state: &str) -> Option<String> {
    let state = state.trim();
    if state.len() == 2 && state.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Some(state.to_uppercase());
    }

    STATE_CODES
        .get(state.to_lowercase().as_str())
        .map(|code| (*code).to_owned())
}

const fn crossing(
    name: &'static str,
    west: &'static str,
    east: &'static str,
    lat: f64,
    lon: f64,
) -> Crossing {
    Crossing {
        name,
        states: [west, east],
        lat,
        lon,
    }
}

static CORRIDORS: &[&str] = &["I-80", "I-35", "I-70", "I-90", "I-94"];

static I80: &[Crossing] = &[
    crossing("Verdi", "CA", "NV", 39.518, -120.003),
    crossing("Wendover", "NV", "UT", 40.739, -114.037),
    crossing("Evanston", "UT", "WY", 41.222, -111.046),
    crossing("Pine Bluffs", "WY", "NE", 41.184, -104.053),
    crossing("Council Bluffs", "NE", "IA", 41.247, -95.924),
    crossing("Quad Cities", "IA", "IL", 41.574, -90.394),
    crossing("Chicago-Hammond", "IL", "IN", 41.578, -87.524),
    crossing("Indiana Toll Road East", "IN", "OH", 41.700, -84.806),
    crossing("Sharon", "OH", "PA", 41.085, -80.519),
    crossing("Delaware Water Gap", "PA", "NJ", 40.972, -75.127),
];

static I35: &[Crossing] = &[
    crossing("Northwood", "MN", "IA", 43.500, -93.350),
    crossing("Lamoni", "IA", "MO", 40.573, -93.948),
    crossing("Kansas City", "MO", "KS", 39.079, -94.608),
    crossing("South Haven", "KS", "OK", 36.999, -97.128),
];

static I70: &[Crossing] = &[
    crossing("Rabbit Valley", "UT", "CO", 39.183, -109.051),
    crossing("Kanorado", "CO", "KS", 39.306, -102.047),
    crossing("Kansas City East", "KS", "MO", 39.113, -94.607),
    crossing("St. Louis", "MO", "IL", 38.636, -90.183),
    crossing("Terre Haute", "IL", "IN", 39.478, -87.533),
    crossing("Richmond", "IN", "OH", 39.847, -84.814),
    crossing("Wheeling", "OH", "WV", 40.064, -80.739),
    crossing("West Alexander", "WV", "PA", 40.099, -80.519),
];

static I90: &[Crossing] = &[
    crossing("Beaver Creek", "SD", "MN", 43.609, -96.453),
    crossing("La Crosse", "MN", "WI", 43.884, -91.290),
    crossing("South Beloit", "WI", "IL", 42.497, -89.041),
    crossing("Chicago-Hammond", "IL", "IN", 41.578, -87.524),
    crossing("Indiana Toll Road East", "IN", "OH", 41.700, -84.806),
    crossing("Conneaut", "OH", "PA", 41.939, -80.519),
    crossing("Ripley", "PA", "NY", 42.269, -79.762),
];

static I94: &[Crossing] = &[
    crossing("Fargo-Moorhead", "ND", "MN", 46.864, -96.770),
    crossing("Hudson", "MN", "WI", 44.962, -92.767),
    crossing("Kenosha", "WI", "IL", 42.495, -87.960),
    crossing("Calumet", "IL", "IN", 41.577, -87.525),
    crossing("Michiana", "IN", "MI", 41.759, -86.824),
];

/// Crossing tables by corridor designator
static CROSSINGS: phf::Map<&'static str, &'static [Crossing]> = phf_map! {
    "I-80" => I80,
    "I-35" => I35,
    "I-70" => I70,
    "I-90" => I90,
    "I-94" => I94,
};

/// Full state names for the states covered corridors traverse
static STATE_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "california" => "CA",
    "colorado" => "CO",
    "illinois" => "IL",
    "indiana" => "IN",
    "iowa" => "IA",
    "kansas" => "KS",
    "michigan" => "MI",
    "minnesota" => "MN",
    "missouri" => "MO",
    "nebraska" => "NE",
    "nevada" => "NV",
    "new jersey" => "NJ",
    "new york" => "NY",
    "north dakota" => "ND",
    "ohio" => "OH",
    "oklahoma" => "OK",
    "pennsylvania" => "PA",
    "south dakota" => "SD",
    "utah" => "UT",
    "west virginia" => "WV",
    "wisconsin" => "WI",
    "wyoming" => "WY",
};
