//! Event classification and advisory message formatting

mod cifs;
mod severity;
mod tim;
mod timing;
mod typecode;

pub use cifs::{
    CifsCategory, CifsData, CifsLocation, CifsMessage, CifsSubtype, CifsType, LaneImpact,
};
pub use severity::Severity;
pub use tim::{
    is_commercial_vehicle_relevant, TimContent, TimData, TimLocation, TimMessage, TimRoute,
    TimValidity,
};
pub use timing::{parse_feed_timestamp, InvalidTimestamp, TimingInfo};
pub use typecode::TypeCode;
