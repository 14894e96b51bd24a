//! Aircraft engine physics
//!
//! - `particulate_matter`: ICAO Doc 9889 First Order Approximation of PM emission indices
//! - `fuel_flow`: fuel flow at arbitrary power settings from EEDB certification data

pub mod fuel_flow;
pub mod particulate_matter;

pub use fuel_flow::fuel_flow;
pub use particulate_matter::{compute_particulate_matter, ParticulateMatterIndices};
