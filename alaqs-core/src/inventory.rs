//! Aggregation of run results into an emission inventory.

use crate::emission::Emission;
use crate::model::{EmissionSink, TimeAxis};
use crate::module::{Diagnostic, ProcessOutput};
use crate::pollutants::{Pollutant, POLLUTANT_COUNT};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use ndarray::{Array1, Array2, Axis};

/// Totals of a run: per step, per source and per module.
///
/// `totals` has one row per step and one column per pollutant, in the order of
/// [`Pollutant::ALL`].
#[derive(Debug, Clone)]
pub struct EmissionInventory {
    timestamps: Vec<NaiveDateTime>,
    totals: Array2<f64>,
    by_source: IndexMap<String, Emission>,
    by_module: IndexMap<String, Emission>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for EmissionInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl EmissionInventory {
    pub fn new() -> Self {
        Self {
            timestamps: Vec::new(),
            totals: Array2::zeros((0, POLLUTANT_COUNT)),
            by_source: IndexMap::new(),
            by_module: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Step-by-pollutant totals in kg
    pub fn totals(&self) -> &Array2<f64> {
        &self.totals
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Total mass of each pollutant over the whole run
    pub fn grand_total(&self) -> Array1<f64> {
        self.totals.sum_axis(Axis(0))
    }

    pub fn total(&self, pollutant: Pollutant) -> f64 {
        self.totals.column(pollutant.index()).sum()
    }

    /// Totals per source, keyed by `module/source id`
    pub fn by_source(&self) -> &IndexMap<String, Emission> {
        &self.by_source
    }

    pub fn source_total(&self, module: &str, source_id: &str) -> Option<&Emission> {
        self.by_source.get(&source_key(module, source_id))
    }

    pub fn by_module(&self) -> &IndexMap<String, Emission> {
        &self.by_module
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn ensure_step(&mut self, step: usize, timestamp: NaiveDateTime) {
        while self.totals.nrows() <= step {
            let zeros = Array1::<f64>::zeros(POLLUTANT_COUNT);
            // Rows always have POLLUTANT_COUNT columns, so this cannot fail
            let _ = self.totals.push_row(zeros.view());
        }
        if self.timestamps.len() <= step {
            self.timestamps.resize(step + 1, timestamp);
        }
        self.timestamps[step] = timestamp;
    }
}

fn source_key(module: &str, source_id: &str) -> String {
    format!("{module}/{source_id}")
}

impl EmissionSink for EmissionInventory {
    fn begin_run(&mut self, time_axis: &TimeAxis) {
        self.timestamps = time_axis.iter().map(|(start, _)| start).collect();
        self.totals = Array2::zeros((time_axis.len(), POLLUTANT_COUNT));
    }

    fn record(&mut self, step: usize, timestamp: NaiveDateTime, module: &str, output: ProcessOutput) {
        self.ensure_step(step, timestamp);

        let mut module_total = Emission::new();
        for record in &output.records {
            let total = record.total();
            for (pollutant, kg) in total.iter() {
                self.totals[[step, pollutant.index()]] += kg;
            }
            module_total += &total;

            let source_total = self
                .by_source
                .entry(source_key(module, record.source.id()))
                .or_insert_with(|| Emission::with_geometry(record.source.geometry_text()));
            *source_total += &total;
        }
        *self.by_module.entry(module.to_string()).or_default() += &module_total;
        self.diagnostics.extend(output.diagnostics);
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
