//! Aircraft Movement Parameters
//!
//! Times in mode and fuel conversion constants for the landing and take-off (LTO)
//! cycle of an aircraft movement.
//!
//! # Reference
//!
//! ICAO Annex 16 Volume II reference LTO cycle, with taxi times as used for
//! airport inventories (19 minutes taxi-out, 7 minutes taxi-in).

use alaqs_core::flight_mode::FlightMode;
use alaqs_core::movement::MovementKind;
use serde::{Deserialize, Serialize};

/// Parameters for aircraft movement emissions
///
/// Each LTO mode is flown for a fixed time. Taxi is the only mode whose duration
/// depends on the movement direction, and it can be overridden per movement.
///
/// Fuel burnt in a mode is:
///
/// $$ m_{fuel} = \dot{m}_{fuel} \cdot t_{mode} \cdot n_{engines} $$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParameters {
    /// Taxi time of a departure, from stand to runway hold
    /// unit: s
    /// default: 1140
    pub taxi_out_s: f64,

    /// Taxi time of an arrival, from runway exit to stand
    /// unit: s
    /// default: 420
    pub taxi_in_s: f64,

    /// Time in approach mode, from 3000 ft to touchdown
    /// unit: s
    /// default: 240
    pub approach_s: f64,

    /// Time in climb-out mode, from end of take-off roll to 3000 ft
    /// unit: s
    /// default: 132
    pub climb_out_s: f64,

    /// Time in take-off mode
    /// unit: s
    /// default: 42
    pub takeoff_s: f64,

    /// Mass of CO2 formed per mass of jet fuel burnt
    /// unit: kg / kg
    /// default: 3.16
    pub co2_per_kg_fuel: f64,
}

impl Default for MovementParameters {
    fn default() -> Self {
        Self {
            taxi_out_s: 1140.0,
            taxi_in_s: 420.0,
            approach_s: 240.0,
            climb_out_s: 132.0,
            takeoff_s: 42.0,
            co2_per_kg_fuel: 3.16,
        }
    }
}

impl MovementParameters {
    /// Time spent in `mode` by a movement of the given kind
    /// unit: s
    pub fn time_in_mode(&self, kind: MovementKind, mode: FlightMode) -> f64 {
        match (mode, kind) {
            (FlightMode::Taxi, MovementKind::Departure) => self.taxi_out_s,
            (FlightMode::Taxi, MovementKind::Arrival) => self.taxi_in_s,
            (FlightMode::Approach, _) => self.approach_s,
            (FlightMode::ClimbOut, _) => self.climb_out_s,
            (FlightMode::TakeOff, _) => self.takeoff_s,
        }
    }
}
