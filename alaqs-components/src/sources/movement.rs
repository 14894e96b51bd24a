//! Aircraft movements
//!
//! Each arrival or departure flies the modes of the LTO cycle: approach and taxi-in for
//! an arrival; taxi-out, take-off and climb-out for a departure. For every mode:
//!
//! 1. Fuel flow per engine is the certified EEDB value for the mode, or the
//!    [twin-quadratic interpolation](crate::aircraft::fuel_flow) at the movement's
//!    power setting when it overrides the mode (e.g. reduced take-off thrust).
//! 2. Fuel burnt is $\dot{m}_{fuel} \cdot t_{mode} \cdot n_{engines}$.
//! 3. The mode's emission factors (g/kg fuel) are applied to the fuel burnt.
//! 4. CO2 follows from the fuel unless the index provides a factor for it.
//! 5. Where the engine has a smoke number for the mode and the index has no PM10
//!    factor, particulate matter is estimated with the
//!    [First Order Approximation](crate::aircraft::particulate_matter).
//!
//! The whole LTO cycle is attributed to the interval containing the movement time.

use crate::aircraft::fuel_flow::fuel_flow;
use crate::aircraft::particulate_matter::ParticulateMatterIndices;
use crate::parameters::MovementParameters;
use alaqs_core::emission::{AccumulationReport, Emission};
use alaqs_core::emission_index::IndexUnit;
use alaqs_core::errors::{AlaqsError, AlaqsResult};
use alaqs_core::flight_mode::FlightMode;
use alaqs_core::module::{
    DiagnosticKind, JobState, ModuleState, ProcessOutput, SourceEmissions, SourceFilter,
    SourceModule, SourceRef,
};
use alaqs_core::movement::Movement;
use alaqs_core::pollutants::Pollutant;
use alaqs_core::store::MovementStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const CO2_KEY: &str = "co2_kg";
const HC_KEY: &str = "hc_kg";
const PM10_KEY: &str = "pm10_kg";

/// Emissions of one movement in one mode, with anything worth reporting
struct ModeEmission {
    emission: Emission,
    report: AccumulationReport,
}

/// Module for aircraft movements
#[derive(Debug, Serialize, Deserialize)]
pub struct MovementSourceModule {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default = "crate::sources::enabled")]
    pub enable: bool,
    #[serde(default)]
    pub parameters: MovementParameters,
    #[serde(skip)]
    job: JobState<MovementStore>,
}

impl MovementSourceModule {
    pub const NAME: &'static str = "MovementSource";

    /// Module reading its movements from a TOML store when the job begins
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: Some(path.into()),
            enable: true,
            parameters: MovementParameters::default(),
            job: JobState::default(),
        }
    }

    /// Module using an already loaded store
    pub fn with_store(store: MovementStore) -> Self {
        Self {
            store_path: None,
            enable: true,
            parameters: MovementParameters::default(),
            job: JobState::with_store(store),
        }
    }

    pub fn with_parameters(self, parameters: MovementParameters) -> Self {
        Self { parameters, ..self }
    }

    pub fn parameters(&self) -> &MovementParameters {
        &self.parameters
    }

    /// Fuel flow of one engine in `mode`
    /// unit: kg / s
    fn engine_fuel_flow(&self, movement: &Movement, mode: FlightMode) -> AlaqsResult<f64> {
        let engine = &movement.engine;
        match movement.power_settings.get(&mode) {
            Some(&power_setting) => fuel_flow(power_setting, &engine.fuel_flow),
            None => engine.fuel_flow.get(&mode).copied().ok_or_else(|| {
                AlaqsError::MissingData(format!("{} has no fuel flow for {mode}", engine.name))
            }),
        }
    }

    /// unit: s
    fn time_in_mode(&self, movement: &Movement, mode: FlightMode) -> f64 {
        match (mode, movement.taxi_time_s) {
            (FlightMode::Taxi, Some(taxi_time_s)) => taxi_time_s,
            _ => self.parameters.time_in_mode(movement.kind, mode),
        }
    }

    fn mode_emission(&self, movement: &Movement, mode: FlightMode) -> AlaqsResult<ModeEmission> {
        let engine = &movement.engine;
        let factors = engine.emission_index.for_mode(mode);

        let fuel_kg = self.engine_fuel_flow(movement, mode)?
            * self.time_in_mode(movement, mode)
            * f64::from(movement.engine_count);

        let mut emission = Emission::with_geometry(movement.geometry_for(mode));
        emission.add(Pollutant::Fuel, fuel_kg);
        let report = emission.add_generic(factors, fuel_kg, IndexUnit::GramsPerKgFuel);

        if !factors.contains_key(CO2_KEY) {
            emission.add(Pollutant::CO2, self.parameters.co2_per_kg_fuel * fuel_kg);
        }

        if let Some(&smoke_number) = engine.smoke_number.get(&mode) {
            if !factors.contains_key(PM10_KEY) {
                let ei_hc = factors.get(HC_KEY).copied().unwrap_or(0.0);
                let pm =
                    ParticulateMatterIndices::for_mode(mode, smoke_number, ei_hc, engine.bypass_ratio);
                let fuel_tonnes = fuel_kg / 1000.0;

                emission.add(Pollutant::PM10NonVolatile, pm.non_volatile * fuel_tonnes);
                emission.add(Pollutant::PM10Sulphur, pm.fuel_sulphur * fuel_tonnes);
                emission.add(Pollutant::PM10Organic, pm.volatile * fuel_tonnes);
                for pollutant in [Pollutant::PM10, Pollutant::P2, Pollutant::P1] {
                    emission.add(pollutant, pm.total * fuel_tonnes);
                }
            }
        }

        Ok(ModeEmission { emission, report })
    }

    /// Emissions of every mode flown by `movement`, in the order they are flown
    fn lto_emissions(&self, movement: &Movement) -> AlaqsResult<Vec<ModeEmission>> {
        movement
            .kind
            .modes()
            .iter()
            .map(|&mode| self.mode_emission(movement, mode))
            .collect()
    }
}

#[typetag::serde]
impl SourceModule for MovementSourceModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_enabled(&self) -> bool {
        self.enable
    }

    fn state(&self) -> ModuleState {
        self.job.state()
    }

    fn begin_job(&mut self) -> AlaqsResult<()> {
        let path = self.store_path.clone();
        self.job.begin(Self::NAME, || match path {
            Some(path) => MovementStore::open(&path),
            None => Err(AlaqsError::Configuration(format!(
                "{} has no store_path",
                Self::NAME
            ))),
        })
    }

    fn process(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        filter: &SourceFilter,
    ) -> AlaqsResult<ProcessOutput> {
        if end <= start {
            return Err(AlaqsError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let store = self.job.store(Self::NAME)?;
        let (selected, missing) = filter.select(store.iter());

        let mut output = ProcessOutput {
            unmatched: missing,
            ..ProcessOutput::default()
        };

        for movement in selected {
            if movement.time < start || movement.time >= end {
                continue;
            }

            let unit = movement.engine.emission_index.unit;
            if unit != IndexUnit::GramsPerKgFuel {
                let kind = DiagnosticKind::UnitMismatch {
                    expected: IndexUnit::GramsPerKgFuel,
                    found: unit,
                };
                output.report(Self::NAME, &movement.id, start, kind);
                continue;
            }

            let emissions: Vec<Emission> = match self.lto_emissions(movement) {
                Ok(modes) => modes
                    .into_iter()
                    .map(|ModeEmission { emission, report }| {
                        output.report_accumulation(Self::NAME, &movement.id, start, report);
                        emission
                    })
                    .collect(),
                Err(e) => {
                    output.report(Self::NAME, &movement.id, start, DiagnosticKind::FuelFlow(e));
                    movement
                        .kind
                        .modes()
                        .iter()
                        .map(|&mode| Emission::with_geometry(movement.geometry_for(mode)))
                        .collect()
                }
            };

            output.records.push(SourceEmissions {
                timestamp: start,
                source: SourceRef::Movement(movement.clone()),
                emissions,
            });
        }

        debug!(
            module = Self::NAME,
            %start,
            %end,
            movements = output.records.len(),
            "processed interval"
        );
        Ok(output)
    }

    fn end_job(&mut self) {
        self.job.end(Self::NAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alaqs_core::emission_index::EmissionIndex;
    use alaqs_core::movement::{AircraftEngine, MovementKind};
    use chrono::{Duration, NaiveDate};
    use is_close::is_close;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 8, 3)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn engine() -> Arc<AircraftEngine> {
        let emission_index = EmissionIndex::new("CFM56-5B4/P", IndexUnit::GramsPerKgFuel)
            .with_mode_factor(FlightMode::TakeOff, "nox_kg", 28.0)
            .with_mode_factor(FlightMode::TakeOff, "hc_kg", 0.03)
            .with_mode_factor(FlightMode::ClimbOut, "nox_kg", 22.0)
            .with_mode_factor(FlightMode::Approach, "nox_kg", 8.5)
            .with_mode_factor(FlightMode::Approach, "pm10_kg", 0.1)
            .with_mode_factor(FlightMode::Taxi, "nox_kg", 4.5)
            .with_mode_factor(FlightMode::Taxi, "co_kg", 24.0)
            .with_mode_factor(FlightMode::Taxi, "hc_kg", 2.0);
        Arc::new(AircraftEngine {
            name: "CFM56-5B4/P".to_string(),
            bypass_ratio: 5.7,
            engine_count: 2,
            fuel_flow: BTreeMap::from([
                (FlightMode::TakeOff, 1.166),
                (FlightMode::ClimbOut, 0.961),
                (FlightMode::Approach, 0.326),
                (FlightMode::Taxi, 0.111),
            ]),
            smoke_number: BTreeMap::from([(FlightMode::TakeOff, 10.0), (FlightMode::Approach, 5.0)]),
            emission_index,
        })
    }

    fn module(movements: Vec<Movement>) -> MovementSourceModule {
        let mut store = MovementStore::new();
        for movement in movements {
            store.insert(movement).unwrap();
        }
        let mut module = MovementSourceModule::with_store(store);
        module.begin_job().unwrap();
        module
    }

    fn departure(id: &str, time: NaiveDateTime) -> Movement {
        Movement::new(id, time, MovementKind::Departure, engine())
    }

    fn arrival(id: &str, time: NaiveDateTime) -> Movement {
        Movement::new(id, time, MovementKind::Arrival, engine())
    }

    // ===== Fuel and gaseous emissions =====

    #[test]
    fn departure_modes() {
        let module = module(vec![departure("D1", at(9, 10))]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();

        assert!(output.diagnostics.is_empty());
        let emissions = &output.records[0].emissions;
        assert_eq!(emissions.len(), 3);

        let (taxi, take_off, climb_out) = (&emissions[0], &emissions[1], &emissions[2]);
        assert!(is_close!(taxi.fuel_kg(), 0.111 * 1140.0 * 2.0));
        assert!(is_close!(take_off.fuel_kg(), 1.166 * 42.0 * 2.0));
        assert!(is_close!(climb_out.fuel_kg(), 0.961 * 132.0 * 2.0));

        assert!(is_close!(take_off.nox_kg(), 28.0 * take_off.fuel_kg() / 1000.0));
        assert!(is_close!(taxi.co_kg(), 24.0 * taxi.fuel_kg() / 1000.0));
        assert!(is_close!(climb_out.co2_kg(), 3.16 * climb_out.fuel_kg()));
    }

    #[test]
    fn arrival_modes() {
        let module = module(vec![arrival("A1", at(9, 50))]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();
        let emissions = &output.records[0].emissions;

        assert_eq!(emissions.len(), 2);
        assert!(is_close!(emissions[0].fuel_kg(), 0.326 * 240.0 * 2.0));
        assert!(is_close!(emissions[1].fuel_kg(), 0.111 * 420.0 * 2.0));
    }

    #[test]
    fn taxi_time_and_engine_count_overrides() {
        let mut single = departure("D2", at(9, 0)).with_taxi_time(600.0);
        single.engine_count = 1;
        let module = module(vec![single]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();

        assert!(is_close!(
            output.records[0].emissions[0].fuel_kg(),
            0.111 * 600.0
        ));
    }

    #[test]
    fn reduced_take_off_thrust_uses_interpolated_fuel_flow() {
        let module = module(vec![
            departure("D3", at(9, 0)).with_power_setting(FlightMode::TakeOff, 0.9)
        ]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();
        let expected = fuel_flow(0.9, &engine().fuel_flow).unwrap() * 42.0 * 2.0;

        assert!(is_close!(output.records[0].emissions[1].fuel_kg(), expected));
        assert!(expected < 1.166 * 42.0 * 2.0);
    }

    // ===== Particulate matter =====

    #[test]
    fn first_order_approximation_fills_pm() {
        let module = module(vec![departure("D4", at(9, 0))]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();
        let take_off = &output.records[0].emissions[1];
        let pm = ParticulateMatterIndices::for_mode(FlightMode::TakeOff, 10.0, 0.03, 5.7);
        let fuel_tonnes = take_off.fuel_kg() / 1000.0;

        assert!(is_close!(take_off.pm10_nonvol_kg(), pm.non_volatile * fuel_tonnes));
        assert!(is_close!(take_off.pm10_sul_kg(), pm.fuel_sulphur * fuel_tonnes));
        assert!(is_close!(take_off.pm10_organic_kg(), pm.volatile * fuel_tonnes));
        assert!(is_close!(take_off.pm10_kg(), pm.total * fuel_tonnes));
        assert!(is_close!(take_off.p1_kg(), take_off.pm10_kg()));

        // No smoke number for taxi
        assert_eq!(output.records[0].emissions[0].pm10_kg(), 0.0);
    }

    #[test]
    fn index_pm_takes_precedence() {
        let module = module(vec![arrival("A2", at(9, 0))]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();
        let approach = &output.records[0].emissions[0];

        assert!(is_close!(approach.pm10_kg(), 0.1 * approach.fuel_kg() / 1000.0));
        assert_eq!(approach.pm10_nonvol_kg(), 0.0);
    }

    // ===== Interval and errors =====

    #[test]
    fn movements_outside_interval_are_skipped() {
        let module = module(vec![
            departure("EARLY", at(8, 59)),
            departure("IN", at(9, 0)),
            arrival("LATE", at(10, 0)),
        ]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();

        let ids: Vec<&str> = output.records.iter().map(|r| r.source.id()).collect();
        assert_eq!(ids, vec!["IN"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn invalid_power_setting_zeroes_movement() {
        let module = module(vec![
            departure("BAD", at(9, 0)).with_power_setting(FlightMode::TakeOff, 1.5),
            departure("GOOD", at(9, 30)),
        ]);

        let output = module.process(at(9, 0), at(10, 0), &SourceFilter::All).unwrap();

        assert_eq!(output.records.len(), 2);
        assert!(output.records[0].emissions.iter().all(Emission::is_zero));
        assert!(output.records[1].total().fuel_kg() > 0.0);
        assert_eq!(output.diagnostics.len(), 1);
        assert!(matches!(
            output.diagnostics[0].kind,
            DiagnosticKind::FuelFlow(AlaqsError::InvalidInput(_))
        ));
    }

    #[test]
    fn mode_geometry_override() {
        let mut movement = departure("D5", at(9, 0)).with_geometry("POINT (0 0)");
        movement
            .mode_geometry
            .insert(FlightMode::Taxi, "LINESTRING (0 0, 100 0)".to_string());
        let module = module(vec![movement]);

        let output = module
            .process(at(9, 0), at(9, 0) + Duration::minutes(30), &SourceFilter::All)
            .unwrap();
        let emissions = &output.records[0].emissions;

        assert_eq!(emissions[0].geometry_text(), "LINESTRING (0 0, 100 0)");
        assert_eq!(emissions[1].geometry_text(), "POINT (0 0)");
    }

    #[test]
    fn parameters_from_toml() {
        let module: MovementSourceModule = toml::from_str(
            r#"
            store_path = "movements.toml"

            [parameters]
            takeoff_s = 36.0
            "#,
        )
        .unwrap();

        assert!(module.enable);
        assert_eq!(module.parameters().takeoff_s, 36.0);
        assert_eq!(module.parameters().climb_out_s, 132.0);
    }
}
