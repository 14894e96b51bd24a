//! The frozen set of pollutant accumulators.
//!
//! Every [`crate::emission::Emission`] carries exactly these thirteen masses, in kilograms,
//! in the order of [`Pollutant::ALL`]. Emission index tables refer to them by key
//! (e.g. `co_kg`); any other key is reported as unknown rather than accumulated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pollutant accumulators.
pub const POLLUTANT_COUNT: usize = 13;

/// A pollutant tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "fuel_kg")]
    Fuel,
    #[serde(rename = "co2_kg")]
    CO2,
    #[serde(rename = "co_kg")]
    CO,
    #[serde(rename = "hc_kg")]
    HC,
    #[serde(rename = "nox_kg")]
    NOx,
    #[serde(rename = "sox_kg")]
    SOx,
    #[serde(rename = "pm10_kg")]
    PM10,
    /// PM1
    #[serde(rename = "p1_kg")]
    P1,
    /// PM2.5
    #[serde(rename = "p2_kg")]
    P2,
    /// PM10 from the pre-FOA3 estimation method
    #[serde(rename = "pm10_prefoa3_kg")]
    PM10PreFOA3,
    #[serde(rename = "pm10_nonvol_kg")]
    PM10NonVolatile,
    #[serde(rename = "pm10_sul_kg")]
    PM10Sulphur,
    #[serde(rename = "pm10_organic_kg")]
    PM10Organic,
}

impl Pollutant {
    pub const ALL: [Pollutant; POLLUTANT_COUNT] = [
        Pollutant::Fuel,
        Pollutant::CO2,
        Pollutant::CO,
        Pollutant::HC,
        Pollutant::NOx,
        Pollutant::SOx,
        Pollutant::PM10,
        Pollutant::P1,
        Pollutant::P2,
        Pollutant::PM10PreFOA3,
        Pollutant::PM10NonVolatile,
        Pollutant::PM10Sulphur,
        Pollutant::PM10Organic,
    ];

    /// Key used in emission index tables and output records
    pub fn key(&self) -> &'static str {
        match self {
            Pollutant::Fuel => "fuel_kg",
            Pollutant::CO2 => "co2_kg",
            Pollutant::CO => "co_kg",
            Pollutant::HC => "hc_kg",
            Pollutant::NOx => "nox_kg",
            Pollutant::SOx => "sox_kg",
            Pollutant::PM10 => "pm10_kg",
            Pollutant::P1 => "p1_kg",
            Pollutant::P2 => "p2_kg",
            Pollutant::PM10PreFOA3 => "pm10_prefoa3_kg",
            Pollutant::PM10NonVolatile => "pm10_nonvol_kg",
            Pollutant::PM10Sulphur => "pm10_sul_kg",
            Pollutant::PM10Organic => "pm10_organic_kg",
        }
    }

    /// Look up a pollutant by its key
    ///
    /// Returns `None` for keys outside the frozen set.
    pub fn from_key(key: &str) -> Option<Pollutant> {
        Pollutant::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Position of this pollutant in [`Pollutant::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
