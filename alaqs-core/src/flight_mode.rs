//! ICAO landing and take-off (LTO) cycle modes.

use crate::errors::{AlaqsError, AlaqsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standardised engine operating point of the LTO cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlightMode {
    /// Taxi and ground idle
    #[serde(rename = "TX")]
    Taxi,
    #[serde(rename = "AP")]
    Approach,
    #[serde(rename = "CO")]
    ClimbOut,
    #[serde(rename = "TO")]
    TakeOff,
}

impl FlightMode {
    pub const ALL: [FlightMode; 4] = [
        FlightMode::Taxi,
        FlightMode::Approach,
        FlightMode::ClimbOut,
        FlightMode::TakeOff,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FlightMode::Taxi => "TX",
            FlightMode::Approach => "AP",
            FlightMode::ClimbOut => "CO",
            FlightMode::TakeOff => "TO",
        }
    }

    /// Certification thrust setting of the mode as a fraction of rated thrust
    pub fn thrust_setting(&self) -> f64 {
        match self {
            FlightMode::Taxi => 0.07,
            FlightMode::Approach => 0.30,
            FlightMode::ClimbOut => 0.85,
            FlightMode::TakeOff => 1.00,
        }
    }
}

impl FromStr for FlightMode {
    type Err = AlaqsError;

    fn from_str(s: &str) -> AlaqsResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TX" => Ok(FlightMode::Taxi),
            "AP" => Ok(FlightMode::Approach),
            "CO" => Ok(FlightMode::ClimbOut),
            "TO" => Ok(FlightMode::TakeOff),
            _ => Err(AlaqsError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Serde helpers for maps keyed by [`FlightMode`], written with the mode codes as keys.
pub mod mode_keyed {
    use super::FlightMode;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<V, S>(map: &BTreeMap<FlightMode, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        let keyed: BTreeMap<&str, &V> = map.iter().map(|(m, v)| (m.code(), v)).collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<FlightMode, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let keyed = BTreeMap::<String, V>::deserialize(deserializer)?;
        keyed
            .into_iter()
            .map(|(code, value)| {
                code.parse::<FlightMode>()
                    .map(|mode| (mode, value))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}
