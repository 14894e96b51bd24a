//! Emission indices: per-unit-activity emission factors.

use crate::flight_mode::FlightMode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Table of pollutant key to emission factor, in the order the factors were declared
pub type FactorTable = IndexMap<String, f64>;

/// Declared unit of the factors in an [`EmissionIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexUnit {
    /// Kilograms per unit of activity
    #[serde(rename = "kg")]
    KilogramsPerUnit,
    /// Grams per vehicle
    #[serde(rename = "gm_vh")]
    GramsPerVehicle,
    /// Grams per vehicle-kilometre
    #[serde(rename = "gm_km")]
    GramsPerVehicleKm,
    /// Grams per kilogram of fuel burnt
    #[serde(rename = "g_kg")]
    GramsPerKgFuel,
}

impl IndexUnit {
    /// Factor converting the mass part of the unit to kilograms
    pub fn to_kg(&self) -> f64 {
        match self {
            IndexUnit::KilogramsPerUnit => 1.0,
            IndexUnit::GramsPerVehicle
            | IndexUnit::GramsPerVehicleKm
            | IndexUnit::GramsPerKgFuel => 1.0e-3,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            IndexUnit::KilogramsPerUnit => "kg",
            IndexUnit::GramsPerVehicle => "gm_vh",
            IndexUnit::GramsPerVehicleKm => "gm_km",
            IndexUnit::GramsPerKgFuel => "g_kg",
        }
    }
}

impl fmt::Display for IndexUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Emission factors for one or more pollutants.
///
/// Stationary sources use the generic `factors` table. Aircraft engines additionally
/// carry one table per LTO mode in `modes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionIndex {
    pub name: String,
    pub unit: IndexUnit,
    #[serde(default)]
    pub factors: FactorTable,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        with = "crate::flight_mode::mode_keyed"
    )]
    pub modes: BTreeMap<FlightMode, FactorTable>,
}

impl EmissionIndex {
    pub fn new(name: impl Into<String>, unit: IndexUnit) -> Self {
        Self {
            name: name.into(),
            unit,
            factors: IndexMap::new(),
            modes: BTreeMap::new(),
        }
    }

    /// Add a generic factor
    pub fn with_factor(mut self, key: impl Into<String>, value: f64) -> Self {
        self.factors.insert(key.into(), value);
        self
    }

    /// Add a factor to the table of one flight mode
    pub fn with_mode_factor(mut self, mode: FlightMode, key: impl Into<String>, value: f64) -> Self {
        self.modes
            .entry(mode)
            .or_default()
            .insert(key.into(), value);
        self
    }

    /// Factors for a flight mode, falling back to the generic table
    pub fn for_mode(&self, mode: FlightMode) -> &FactorTable {
        self.modes.get(&mode).unwrap_or(&self.factors)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.factors.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tables_fall_back_to_generic() {
        let index = EmissionIndex::new("CFM56", IndexUnit::GramsPerKgFuel)
            .with_factor("co_kg", 1.0)
            .with_mode_factor(FlightMode::Taxi, "co_kg", 20.0);

        assert_eq!(index.for_mode(FlightMode::Taxi)["co_kg"], 20.0);
        assert_eq!(index.for_mode(FlightMode::TakeOff)["co_kg"], 1.0);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(IndexUnit::KilogramsPerUnit.to_kg(), 1.0);
        assert_eq!(IndexUnit::GramsPerVehicleKm.to_kg(), 0.001);
    }

    #[test]
    fn deserialise_unit_tags() {
        let index: EmissionIndex = serde_json::from_str(
            r#"{"name": "cars", "unit": "gm_km", "factors": {"co_kg": 10.0, "nox_kg": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(index.unit, IndexUnit::GramsPerVehicleKm);
        assert_eq!(index.get("nox_kg"), Some(0.5));
        assert!(index.modes.is_empty());
        let keys: Vec<&String> = index.factors.keys().collect();
        assert_eq!(keys, vec!["co_kg", "nox_kg"]);
    }

    #[test]
    fn mode_tables_are_keyed_by_code() {
        let index = EmissionIndex::new("engine", IndexUnit::GramsPerKgFuel)
            .with_mode_factor(FlightMode::Approach, "hc_kg", 0.1);
        let json = serde_json::to_string(&index).unwrap();
        assert!(json.contains(r#""modes":{"AP":{"hc_kg":0.1}}"#), "{json}");

        let parsed: EmissionIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, index);
    }
}
