//! Airport local air quality emission inventories
//!
//! Emissions of the sources at an airport (aircraft movements, road traffic, car parks,
//! stationary point and area sources) are calculated interval by interval over a study
//! period and collected into an inventory.
//!
//! The engine lives in two crates, re-exported here:
//!
//! - `alaqs-core`: sources, emission indices, temporal profiles, the module lifecycle
//!   and the model that drives modules over a time axis
//! - `alaqs-components`: the source modules and aircraft engine physics
//!
//! Python bindings are available with the `python` feature.

pub use alaqs_components::{aircraft, parameters, sources};
pub use alaqs_core::{
    config, emission, emission_index, errors, flight_mode, inventory, model, module,
    pollutants, profile, source, store,
};

#[cfg(feature = "python")]
mod python;
