//! Point sources
//!
//! Stacks and vents such as boiler houses, incinerators and engine test beds. Activity
//! is counted in operations per year and emission indices are in kilograms per
//! operation.

use super::profiled::ActivityBasis;
use alaqs_core::emission_index::IndexUnit;

profiled_source_module!(
    /// Module for point sources
    PointSourceModule,
    "PointSource"
);

impl ActivityBasis for PointSourceModule {
    fn module_name(&self) -> &str {
        Self::NAME
    }

    fn unit(&self) -> IndexUnit {
        IndexUnit::KilogramsPerUnit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alaqs_core::emission_index::EmissionIndex;
    use alaqs_core::module::{SourceFilter, SourceModule};
    use alaqs_core::profile::TemporalProfile;
    use alaqs_core::source::Source;
    use alaqs_core::store::SourceStore;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use is_close::is_close;
    use std::sync::Arc;

    fn day_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// Boiler running from 08:00 to 16:00 on weekdays only
    fn boiler_profile() -> TemporalProfile {
        let mut hourly = [0.0; 24];
        hourly[8..16].fill(1.0);
        let daily = [1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        TemporalProfile::new(hourly, daily, [1.0; 12]).unwrap()
    }

    fn module() -> PointSourceModule {
        let index = Arc::new(
            EmissionIndex::new("boiler", IndexUnit::KilogramsPerUnit)
                .with_factor("nox_kg", 0.2)
                .with_factor("sox_kg", 0.01),
        );
        let boiler = Source::new("BOILER", 2096.0, index)
            .with_profile(boiler_profile())
            .with_height(25.0);
        let mut module = PointSourceModule::with_store(SourceStore::new().with_source(boiler).unwrap());
        module.begin_job().unwrap();
        module
    }

    #[test]
    fn operations_follow_profile() {
        let module = module();

        // 2024 has 262 weekdays, 8 operating hours each
        let operating_hours = 262.0 * 8.0;
        let per_hour = 2096.0 / operating_hours;

        let night = module
            .process(day_start(), day_start() + Duration::hours(1), &SourceFilter::All)
            .unwrap();
        assert_eq!(night.records[0].emissions[0].nox_kg(), 0.0);

        let morning = day_start() + Duration::hours(9);
        let output = module
            .process(morning, morning + Duration::hours(1), &SourceFilter::All)
            .unwrap();
        let emission = &output.records[0].emissions[0];
        assert!(is_close!(emission.nox_kg(), 0.2 * per_hour));
        assert!(is_close!(emission.sox_kg(), 0.01 * per_hour));
    }

    #[test]
    fn whole_day_sums_hours() {
        let module = module();

        let day = module
            .process(day_start(), day_start() + Duration::days(1), &SourceFilter::All)
            .unwrap();
        let hours: f64 = (0..24)
            .map(|h| {
                let t = day_start() + Duration::hours(h);
                module
                    .process(t, t + Duration::hours(1), &SourceFilter::All)
                    .unwrap()
                    .records[0]
                    .emissions[0]
                    .nox_kg()
            })
            .sum();

        assert!(is_close!(day.records[0].emissions[0].nox_kg(), hours));
        assert!(is_close!(hours, 0.2 * 8.0));
    }
}
