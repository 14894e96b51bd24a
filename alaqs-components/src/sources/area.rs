//! Area sources
//!
//! Diffuse emitters such as fuel farms, fire training grounds or construction sites.
//! Emission indices are in kilograms per unit of annual activity.

use super::profiled::ActivityBasis;
use alaqs_core::emission_index::IndexUnit;

profiled_source_module!(
    /// Module for area sources
    AreaSourceModule,
    "AreaSource"
);

impl ActivityBasis for AreaSourceModule {
    fn module_name(&self) -> &str {
        Self::NAME
    }

    fn unit(&self) -> IndexUnit {
        IndexUnit::KilogramsPerUnit
    }
}
