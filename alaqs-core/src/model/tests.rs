//! Model runs with the test module.

use crate::config::RunConfig;
use crate::emission_index::{EmissionIndex, IndexUnit};
use crate::errors::AlaqsError;
use crate::example_modules::TestSourceModule;
use crate::inventory::EmissionInventory;
use crate::model::{EmissionModelBuilder, RunSummary, MODEL_NAME};
use crate::module::{DiagnosticKind, ModuleState, SourceFilter};
use crate::pollutants::Pollutant;
use crate::source::Source;
use crate::store::SourceStore;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use is_close::is_close;
use std::sync::Arc;

fn jan_first(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn store() -> SourceStore {
    let index = Arc::new(
        EmissionIndex::new("heating", IndexUnit::KilogramsPerUnit).with_factor("nox_kg", 2.0),
    );
    SourceStore::new()
        .with_source(Source::new("H1", 8760.0, Arc::clone(&index)))
        .unwrap()
        .with_source(Source::new("H2", 100.0, Arc::clone(&index)).with_in_study(false))
        .unwrap()
}

#[test]
fn run_over_a_day() {
    let start = jan_first(2023);
    let mut model = EmissionModelBuilder::new()
        .with_period(start, start + Duration::days(1))
        .with_module(Box::new(TestSourceModule::with_store(store())))
        .build()
        .unwrap();

    let mut inventory = EmissionInventory::new();
    let summary = model.run(&mut inventory);

    assert!(model.finished());
    assert_eq!(summary.steps, 24);
    assert!(summary.skipped_modules.is_empty());
    assert_eq!(model.modules()[0].state(), ModuleState::Closed);

    // H1 emits 1 unit per hour at 2 kg NOx per unit, H2 is out of study
    assert_eq!(inventory.totals().nrows(), 24);
    assert!(is_close!(inventory.total(Pollutant::NOx), 48.0));
    assert!(inventory.source_total("TestSource", "H2").is_none());
}

#[test]
fn explicit_filter_reaches_out_of_study_source() {
    let start = jan_first(2023);
    let mut model = EmissionModelBuilder::new()
        .with_period(start, start + Duration::hours(2))
        .with_filter(SourceFilter::from_ids(["H2"]))
        .with_module(Box::new(TestSourceModule::with_store(store())))
        .build()
        .unwrap();

    let mut inventory = EmissionInventory::new();
    model.run(&mut inventory);

    let h2 = inventory.source_total("TestSource", "H2").unwrap();
    assert!(is_close!(h2.nox_kg(), 2.0 * 2.0 * 100.0 / 8760.0));
    assert!(inventory.source_total("TestSource", "H1").is_none());
}

fn single_source_store(id: &str) -> SourceStore {
    let index = Arc::new(
        EmissionIndex::new("heating", IndexUnit::KilogramsPerUnit).with_factor("nox_kg", 1.0),
    );
    SourceStore::new()
        .with_source(Source::new(id, 8760.0, index))
        .unwrap()
}

fn two_module_run(ids: &[&str]) -> (EmissionInventory, RunSummary) {
    let start = jan_first(2023);
    let mut model = EmissionModelBuilder::new()
        .with_period(start, start + Duration::days(1))
        .with_filter(SourceFilter::from_ids(ids.iter().copied()))
        .with_module(Box::new(TestSourceModule::with_store(single_source_store("A1"))))
        .with_module(Box::new(TestSourceModule::with_store(single_source_store("P1"))))
        .build()
        .unwrap();

    let mut inventory = EmissionInventory::new();
    let summary = model.run(&mut inventory);
    (inventory, summary)
}

#[test]
fn filter_spanning_modules_reports_nothing() {
    let (inventory, summary) = two_module_run(&["A1", "P1"]);

    assert_eq!(summary.steps, 24);
    assert_eq!(summary.diagnostics, 0);
    assert!(summary.unknown_sources.is_empty());
    assert!(inventory.diagnostics().is_empty());
    // Each module emits its own source: 1 unit per hour at 1 kg NOx
    assert!(is_close!(inventory.total(Pollutant::NOx), 48.0));
}

#[test]
fn unknown_filter_id_is_reported_once_per_run() {
    let (inventory, summary) = two_module_run(&["A1", "Z9"]);

    assert_eq!(summary.unknown_sources, vec!["Z9".to_string()]);
    assert_eq!(summary.diagnostics, 1);

    let diagnostics = inventory.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].module, MODEL_NAME);
    assert_eq!(diagnostics[0].source_id, "Z9");
    assert_eq!(diagnostics[0].timestamp, jan_first(2023));
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnknownSource);
    assert!(is_close!(inventory.total(Pollutant::NOx), 24.0));
}

#[test]
fn module_with_missing_store_is_skipped() {
    let start = jan_first(2023);
    let mut model = EmissionModelBuilder::new()
        .with_period(start, start + Duration::hours(3))
        .with_module(Box::new(TestSourceModule::from_path(
            "/nonexistent/alaqs/store.toml",
        )))
        .with_module(Box::new(TestSourceModule::with_store(store())))
        .build()
        .unwrap();

    let mut inventory = EmissionInventory::new();
    let summary = model.run(&mut inventory);

    assert_eq!(summary.skipped_modules.len(), 1);
    assert!(matches!(
        summary.skipped_modules[0].1,
        AlaqsError::Configuration(_)
    ));
    assert!(is_close!(inventory.total(Pollutant::NOx), 6.0));
}

#[test]
fn builder_requires_period() {
    let result = EmissionModelBuilder::new().build();
    assert!(matches!(result, Err(AlaqsError::Configuration(_))));
}

#[test]
fn run_config_from_toml() {
    let config = RunConfig::from_toml_str(
        r#"
start = "2023-03-01T00:00:00"
end = "2023-03-01T06:00:00"
step_minutes = 30
sources = ["all"]

[[modules]]
type = "TestSourceModule"
store_path = "/nonexistent/alaqs/store.toml"
enable = false
"#,
    )
    .unwrap();

    assert_eq!(config.filter(), SourceFilter::All);
    assert_eq!(config.modules.len(), 1);
    assert!(!config.modules[0].is_enabled());

    let model = config.into_model().unwrap();
    assert_eq!(model.time_axis().len(), 12);
}

#[test]
fn run_config_rejects_out_of_range_step() {
    for step_minutes in [0, -5, i64::MAX] {
        let config = RunConfig {
            start: jan_first(2023),
            end: jan_first(2024),
            step_minutes,
            sources: vec![],
            modules: vec![],
        };
        let result = config.into_model();
        assert!(
            matches!(result, Err(AlaqsError::Configuration(_))),
            "step_minutes = {step_minutes}"
        );
    }
}

#[test]
fn run_config_rejects_unknown_module_type() {
    let result = RunConfig::from_toml_str(
        r#"
start = "2023-03-01T00:00:00"
end = "2023-03-02T00:00:00"

[[modules]]
type = "DispersionModule"
"#,
    );
    assert!(matches!(result, Err(AlaqsError::Configuration(_))));
}

#[test]
fn run_config_serialises_modules() {
    let config = RunConfig {
        start: jan_first(2023),
        end: jan_first(2024),
        step_minutes: 60,
        sources: vec![],
        modules: vec![Box::new(TestSourceModule::from_path("stores/heating.toml"))],
    };
    let serialised = toml::to_string(&config).unwrap();
    assert!(serialised.contains("type = \"TestSourceModule\""), "{serialised}");

    let parsed = RunConfig::from_toml_str(&serialised).unwrap();
    assert_eq!(parsed.modules[0].name(), "TestSource");
}
