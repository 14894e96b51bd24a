//! Source modules and aircraft physics for airport emission inventories
//!
//! # Module Organisation
//!
//! - `sources`: the source modules (area, point, parking, roadway and aircraft movements)
//! - `aircraft`: engine physics (PM First Order Approximation, fuel flow interpolation)
//!
//! # Parameters
//!
//! Modules with tunable constants have an associated parameters struct in the
//! `parameters` module, with defaults matching the ICAO reference LTO cycle.

pub mod aircraft;
pub mod parameters;
pub mod sources;
