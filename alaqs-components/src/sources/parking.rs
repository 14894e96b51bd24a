//! Parking sources
//!
//! Car parks, counted in vehicles per year. Emission indices are in grams per vehicle
//! and cover the cold start and the driving within the car park.

use super::profiled::ActivityBasis;
use alaqs_core::emission_index::IndexUnit;

profiled_source_module!(
    /// Module for car parks
    ParkingSourceModule,
    "ParkingSource"
);

impl ActivityBasis for ParkingSourceModule {
    fn module_name(&self) -> &str {
        Self::NAME
    }

    fn unit(&self) -> IndexUnit {
        IndexUnit::GramsPerVehicle
    }
}
