use alaqs_components::aircraft::{compute_particulate_matter, fuel_flow};
use alaqs_core::config::RunConfig;
use alaqs_core::errors::AlaqsError;
use alaqs_core::flight_mode::FlightMode;
use alaqs_core::inventory::EmissionInventory;
use alaqs_core::pollutants::Pollutant;
use numpy::{PyArray2, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pythonize::pythonize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

fn to_py_err(e: AlaqsError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// PM emission indices (g/kg fuel) of an engine at one LTO mode
#[pyfunction]
#[pyo3(name = "compute_particulate_matter")]
fn py_compute_particulate_matter(
    py: Python<'_>,
    mode: &str,
    smoke_number: f64,
    ei_hc: f64,
    bypass_ratio: f64,
) -> PyResult<PyObject> {
    let indices =
        compute_particulate_matter(mode, smoke_number, ei_hc, bypass_ratio).map_err(to_py_err)?;
    Ok(pythonize(py, &indices)?)
}

/// Fuel flow (kg/s) at a power setting, from EEDB fuel flows keyed by mode code
#[pyfunction]
#[pyo3(name = "fuel_flow")]
fn py_fuel_flow(power_setting: f64, eedb: HashMap<String, f64>) -> PyResult<f64> {
    let eedb = eedb
        .into_iter()
        .map(|(code, value)| Ok((code.parse::<FlightMode>()?, value)))
        .collect::<Result<BTreeMap<_, _>, AlaqsError>>()
        .map_err(to_py_err)?;
    fuel_flow(power_setting, &eedb).map_err(to_py_err)
}

/// Column names of the totals returned by `run_config`
#[pyfunction]
fn pollutant_keys() -> Vec<&'static str> {
    Pollutant::ALL.iter().map(|p| p.key()).collect()
}

/// Run the configuration at `path`.
///
/// Returns the interval start times, the totals per interval (intervals x pollutants, kg)
/// and the diagnostics raised during the run.
#[pyfunction]
fn run_config(
    py: Python<'_>,
    path: PathBuf,
) -> PyResult<(Vec<String>, Bound<'_, PyArray2<f64>>, Vec<String>)> {
    let mut model = RunConfig::open(&path)
        .and_then(RunConfig::into_model)
        .map_err(to_py_err)?;

    let mut inventory = EmissionInventory::new();
    let summary = model.run(&mut inventory);

    let timestamps = inventory
        .timestamps()
        .iter()
        .map(|t| t.to_string())
        .collect();
    let mut messages: Vec<String> = summary
        .skipped_modules
        .iter()
        .map(|(module, e)| format!("[{module}] skipped: {e}"))
        .collect();
    messages.extend(inventory.diagnostics().iter().map(|d| d.to_string()));

    Ok((timestamps, inventory.totals().to_pyarray_bound(py), messages))
}

#[pymodule]
#[pyo3(name = "_lib")]
fn alaqs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(py_compute_particulate_matter, m)?)?;
    m.add_function(wrap_pyfunction!(py_fuel_flow, m)?)?;
    m.add_function(wrap_pyfunction!(pollutant_keys, m)?)?;
    m.add_function(wrap_pyfunction!(run_config, m)?)?;
    Ok(())
}
