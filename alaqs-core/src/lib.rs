//! Core data model and traits of the ALAQS airport emissions engine.
//!
//! The engine turns per-source activity, temporal allocation profiles and emission
//! indices into time-stepped pollutant masses. This crate holds everything the
//! source-type specific modules share:
//!
//! - [`emission::Emission`]: the thirteen pollutant accumulators of one record
//! - [`emission_index::EmissionIndex`]: per-unit emission factors
//! - [`profile::TemporalProfile`]: hour/day/month activity weighting
//! - [`module::SourceModule`]: the lifecycle and `process` contract of a module
//! - [`model::EmissionModel`]: the loop driving modules over a time axis
//! - [`inventory::EmissionInventory`]: aggregation of the results

pub mod config;
pub mod emission;
pub mod emission_index;
pub mod errors;
pub mod flight_mode;
pub mod inventory;
pub mod model;
pub mod module;
pub mod movement;
pub mod pollutants;
pub mod profile;
pub mod source;
pub mod store;

#[cfg(test)]
mod example_modules;
