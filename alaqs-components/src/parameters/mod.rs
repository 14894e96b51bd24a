//! Component parameters
//!
//! Parameter structures for the source modules. Each struct provides defaults
//! matching the ICAO reference LTO cycle.

mod movement;

pub use movement::MovementParameters;
