use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, ParseError, TimeDelta};
use serde::{Deserialize, Serialize};

pub type FlightId = String;

/// A schedule timestamp. The offset it was written with is kept, so
/// calendar dates are the local ones.
pub type Timestamp = DateTime<FixedOffset>;

/// Station code, e.g. `A0` or `ORD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for AirportCode {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&String> for AirportCode {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scheduled flight leg. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    #[serde(rename = "flight_id")]
    pub id: FlightId,
    pub origin: AirportCode,
    pub dest: AirportCode,
    #[serde(rename = "dep_time", with = "iso_time")]
    pub depart_time: Timestamp,
    #[serde(rename = "arr_time", with = "iso_time")]
    pub arrive_time: Timestamp,
    pub aircraft: String,
}

impl PartialEq for Flight {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Flight {
    pub fn new(
        id: impl Into<FlightId>,
        origin: &str,
        dest: &str,
        depart_time: Timestamp,
        arrive_time: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            origin: AirportCode::from(origin),
            dest: AirportCode::from(dest),
            depart_time,
            arrive_time,
            aircraft: String::from("A320"),
        }
    }

    pub fn with_aircraft(mut self, aircraft: impl Into<String>) -> Self {
        self.aircraft = aircraft.into();
        self
    }

    #[inline]
    pub fn block_time(&self) -> TimeDelta {
        self.arrive_time - self.depart_time
    }
}

/// Parses an ISO-8601 timestamp, keeping its offset. Naive timestamps
/// (the form the schedule generator writes) are taken as UTC.
pub fn parse_time(time: &str) -> Result<Timestamp, ParseError> {
    let time = time.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Timestamp::from(naive.and_utc()))
}

/// UTC timestamps are written without an offset, others with `+hh:mm`.
pub fn format_time(dt: &Timestamp) -> String {
    if dt.offset().local_minus_utc() == 0 {
        format!("{}", dt.format("%Y-%m-%dT%H:%M:%S"))
    } else {
        format!("{}", dt.format("%Y-%m-%dT%H:%M:%S%:z"))
    }
}

/// Serde adapter for the schedule's timestamp columns.
pub(crate) mod iso_time {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    pub fn serialize<S: Serializer>(dt: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(D::Error::custom)
    }
}
