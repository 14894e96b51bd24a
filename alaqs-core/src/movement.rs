//! Aircraft movements and the engines that power them.

use crate::emission_index::EmissionIndex;
use crate::flight_mode::{mode_keyed, FlightMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Direction of an aircraft movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Arrival,
    Departure,
}

impl MovementKind {
    /// LTO modes flown by this kind of movement, in the order they occur
    pub fn modes(&self) -> &'static [FlightMode] {
        match self {
            MovementKind::Arrival => &[FlightMode::Approach, FlightMode::Taxi],
            MovementKind::Departure => &[FlightMode::Taxi, FlightMode::TakeOff, FlightMode::ClimbOut],
        }
    }
}

/// Engine data from the ICAO Engine Exhaust Emissions Databank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftEngine {
    pub name: String,
    #[serde(default)]
    pub bypass_ratio: f64,
    #[serde(default = "default_engine_count")]
    pub engine_count: u32,
    /// Fuel flow per engine at each mode's certification thrust
    /// unit: kg / s
    #[serde(with = "mode_keyed")]
    pub fuel_flow: BTreeMap<FlightMode, f64>,
    /// Smoke number per mode, where measured
    #[serde(default, with = "mode_keyed")]
    pub smoke_number: BTreeMap<FlightMode, f64>,
    /// Emission factors per mode, in grams per kg of fuel
    pub emission_index: EmissionIndex,
}

fn default_engine_count() -> u32 {
    2
}

/// Persisted form of a movement, referencing its engine by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: String,
    pub time: NaiveDateTime,
    pub kind: MovementKind,
    pub engine: String,
    #[serde(default)]
    pub engine_count: Option<u32>,
    /// Overrides the taxi time in mode
    /// unit: s
    #[serde(default)]
    pub taxi_time_s: Option<f64>,
    /// Power setting overrides as a fraction of rated thrust, e.g. reduced take-off thrust
    #[serde(default, with = "mode_keyed")]
    pub power_settings: BTreeMap<FlightMode, f64>,
    #[serde(default)]
    pub geometry_text: String,
    /// Geometry overrides for individual modes (taxi route, runway, approach path)
    #[serde(default, with = "mode_keyed")]
    pub mode_geometry: BTreeMap<FlightMode, String>,
    #[serde(default = "default_in_study")]
    pub in_study: bool,
}

fn default_in_study() -> bool {
    true
}

/// A movement with its engine resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub time: NaiveDateTime,
    pub kind: MovementKind,
    pub engine: Arc<AircraftEngine>,
    pub engine_count: u32,
    pub taxi_time_s: Option<f64>,
    pub power_settings: BTreeMap<FlightMode, f64>,
    pub geometry_text: String,
    pub mode_geometry: BTreeMap<FlightMode, String>,
    pub in_study: bool,
}

impl Movement {
    pub fn new(
        id: impl Into<String>,
        time: NaiveDateTime,
        kind: MovementKind,
        engine: Arc<AircraftEngine>,
    ) -> Self {
        let engine_count = engine.engine_count;
        Self {
            id: id.into(),
            time,
            kind,
            engine,
            engine_count,
            taxi_time_s: None,
            power_settings: BTreeMap::new(),
            geometry_text: String::new(),
            mode_geometry: BTreeMap::new(),
            in_study: true,
        }
    }

    pub fn with_power_setting(mut self, mode: FlightMode, power_setting: f64) -> Self {
        self.power_settings.insert(mode, power_setting);
        self
    }

    pub fn with_taxi_time(self, taxi_time_s: f64) -> Self {
        Self {
            taxi_time_s: Some(taxi_time_s),
            ..self
        }
    }

    pub fn with_geometry(self, geometry_text: impl Into<String>) -> Self {
        Self {
            geometry_text: geometry_text.into(),
            ..self
        }
    }

    /// Geometry for a mode, falling back to the movement geometry
    pub fn geometry_for(&self, mode: FlightMode) -> &str {
        self.mode_geometry
            .get(&mode)
            .map(String::as_str)
            .unwrap_or(&self.geometry_text)
    }
}
