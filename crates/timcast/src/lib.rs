//! # timcast: Traffic Advisory Formatting
//!
//! This crate turns heterogeneous DOT traffic event records into
//! display-oriented advisory messages in two conventions: TIM
//! (Traveler Information Message, after SAE J2735) and CIFS (the
//! Waze-style incident feed). It also detects events close to a
//! state line on the major multi-state interstate corridors.
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! The messages this crate produces are simplified, display-oriented
//! approximations for dashboards and logs. They are **not** wire-format
//! SAE J2735 TIM frames or schema-valid CIFS documents, and must not be
//! fed to systems expecting either.
//!
//! ## Example
//!
//! Events usually arrive as JSON from a state DOT feed. Deserialize
//! them into an [`EventRecord`] and hand them to the formatters:
//!
//! ```
//! use chrono::Utc;
//! use timcast::{
//!     near_border, CifsMessage, EventRecord, TimMessage,
//!     DEFAULT_BORDER_THRESHOLD_MILES,
//! };
//!
//! let event: EventRecord = serde_json::from_str(
//!     r#"{
//!         "id": "UT-2024-0042",
//!         "description": "Bridge construction near Echo Junction",
//!         "severity": "high",
//!         "corridor": "I-80",
//!         "latitude": "41.222",
//!         "longitude": -111.046,
//!         "lanesAffected": "2 of 4 lanes closed"
//!     }"#,
//! )
//! .expect("parse event");
//!
//! let now = Utc::now();
//!
//! // advisory text for dashboard cards
//! let tim = TimMessage::from_event(&event, &now);
//! println!("{}", tim);
//!
//! // the same event in incident feed terms
//! let cifs = CifsMessage::from_event(&event, &now);
//! assert_eq!(cifs.data().status, "ACTIVE");
//!
//! // is it close to a state line?
//! let border = near_border(&event, DEFAULT_BORDER_THRESHOLD_MILES)
//!     .expect("Echo Junction is at the UT/WY line");
//! assert_eq!(border.border_states(), ["UT", "WY"]);
//! ```
//!
//! Formatting never fails: a bare event with nothing but an `id`
//! still produces a complete message, with unknowns spelled out as
//! unknowns. All formatting is pure. The caller supplies the clock,
//! so the same event and the same instant always produce the same
//! message.
//!
//! ## Classification
//!
//! Both formatters classify events with keyword passes over the
//! event's type and description. The two passes are independent and
//! sometimes disagree about the same event: a crash that closes a
//! lane is a lane closure to TIM consumers but an incident to the
//! incident feed. This is deliberate; each pass encodes its own
//! downstream standard. See [`TypeCode::classify()`] and
//! [`CifsCategory::classify()`].
//!
//! ## Background
//!
//! State departments of transportation publish traffic events as
//! loosely standardized JSON: field names vary, coordinates may be
//! numbers or strings, and timestamps come in several shapes.
//! [`EventRecord`] absorbs that variation, and the formatters coerce
//! rather than reject whatever they find.
//!
//! Traveler Information Messages are defined by SAE J2735 for
//! broadcast to connected vehicles from roadside units. CIFS is the
//! interchange format consumer navigation services ingest incident
//! feeds in. Dashboards for corridor coalitions want both renderings
//! side by side, which is the problem this crate solves.
//!
//! Corridors like I-80 span a dozen states, and an event near a
//! state line concerns two DOTs at once. [`near_border()`] checks an
//! event against the state-line crossings of its corridor and
//! reports the first one within a configurable distance.

mod border;
mod event;
mod message;

pub use border::{
    corridors, crossings, group_by_border, near_border, state_code, BorderGroup, BorderProximity,
    Crossing, DEFAULT_BORDER_THRESHOLD_MILES,
};
pub use event::{EventRecord, LooseValue};
pub use message::{
    is_commercial_vehicle_relevant, parse_feed_timestamp, CifsCategory, CifsData, CifsLocation,
    CifsMessage, CifsSubtype, CifsType, InvalidTimestamp, LaneImpact, Severity, TimContent,
    TimData, TimLocation, TimMessage, TimRoute, TimValidity, TimingInfo, TypeCode,
};
