//! Roadway sources
//!
//! Road links around the airport. Activity is counted in vehicles per year along the
//! whole link, emission indices are in grams per vehicle-kilometre, and each link
//! carries its length:
//!
//! $$ E_p = f_p \cdot 10^{-3} \cdot L_{km} \cdot A_{interval} $$

use super::profiled::ActivityBasis;
use alaqs_core::emission_index::IndexUnit;
use alaqs_core::module::DiagnosticKind;
use alaqs_core::source::Source;

profiled_source_module!(
    /// Module for road links
    RoadwaySourceModule,
    "RoadwaySource"
);

impl ActivityBasis for RoadwaySourceModule {
    fn module_name(&self) -> &str {
        Self::NAME
    }

    fn unit(&self) -> IndexUnit {
        IndexUnit::GramsPerVehicleKm
    }

    fn scale(&self, source: &Source) -> Result<f64, DiagnosticKind> {
        match source.length_km {
            Some(length) if length.is_finite() && length > 0.0 => Ok(length),
            _ => Err(DiagnosticKind::MissingLength),
        }
    }
}
