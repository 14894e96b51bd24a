//! Model struct and runtime execution.

use crate::errors::AlaqsError;
use crate::module::{
    Diagnostic, DiagnosticKind, ModuleState, ProcessOutput, SourceFilter, SourceModule,
};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

use super::time_axis::TimeAxis;

/// Module name attached to run-level diagnostics
pub const MODEL_NAME: &str = "EmissionModel";

/// Output stage of a run.
///
/// Receives the result of every module for every step. Persistence, aggregation and
/// display are the sink's responsibility.
pub trait EmissionSink {
    /// Called once before the first step
    fn begin_run(&mut self, _time_axis: &TimeAxis) {}

    fn record(&mut self, step: usize, timestamp: NaiveDateTime, module: &str, output: ProcessOutput);

    /// Run-level diagnostics that belong to no single module output
    fn report(&mut self, _diagnostic: Diagnostic) {}

    /// Called once after the last step
    fn end_run(&mut self) {}
}

/// What happened during a run, beyond the emissions themselves.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of intervals processed
    pub steps: usize,
    /// Modules that could not begin their job and were skipped for the run
    pub skipped_modules: Vec<(String, AlaqsError)>,
    /// Module-level failures of a single interval
    pub failed_steps: Vec<(String, NaiveDateTime, AlaqsError)>,
    /// Number of per-source diagnostics passed to the sink
    pub diagnostics: usize,
    /// Filtered ids that no active module holds
    pub unknown_sources: Vec<String>,
}

/// A set of source modules solved on a common time axis.
#[derive(Debug)]
pub struct EmissionModel {
    modules: Vec<Box<dyn SourceModule>>,
    time_axis: TimeAxis,
    filter: SourceFilter,
    time_index: usize,
    started: bool,
    summary: RunSummary,
    /// Filtered ids not yet matched by any module
    unmatched: Option<BTreeSet<String>>,
}

impl EmissionModel {
    pub fn new(
        modules: Vec<Box<dyn SourceModule>>,
        time_axis: TimeAxis,
        filter: SourceFilter,
    ) -> Self {
        let unmatched = match &filter {
            SourceFilter::All => None,
            SourceFilter::Only(ids) => Some(ids.clone()),
        };
        Self {
            modules,
            time_axis,
            filter,
            time_index: 0,
            started: false,
            summary: RunSummary::default(),
            unmatched,
        }
    }

    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    pub fn modules(&self) -> &[Box<dyn SourceModule>] {
        &self.modules
    }

    /// Gets the time bounds at the current step.
    pub fn current_time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.time_axis.bounds(self.time_index)
    }

    /// Begin the job of every enabled module.
    ///
    /// Modules failing to begin are left out of the run and recorded in the summary.
    pub fn start(&mut self, sink: &mut dyn EmissionSink) {
        if self.started {
            return;
        }
        for module in self.modules.iter_mut().filter(|m| m.is_enabled()) {
            if let Err(e) = module.begin_job() {
                error!(module = module.name(), "skipping module for this run: {e}");
                self.summary
                    .skipped_modules
                    .push((module.name().to_string(), e));
            }
        }
        sink.begin_run(&self.time_axis);
        self.started = true;
    }

    /// Process the current interval with every active module, then advance.
    pub fn step(&mut self, sink: &mut dyn EmissionSink) {
        if !self.started {
            self.start(sink);
        }
        let Some((start, end)) = self.current_time_bounds() else {
            return;
        };
        debug!(%start, %end, "processing interval");

        for module in self
            .modules
            .iter()
            .filter(|m| m.state() == ModuleState::Active)
        {
            match module.process(start, end, &self.filter) {
                Ok(output) => {
                    if let Some(unmatched) = self.unmatched.as_mut() {
                        unmatched.retain(|id| output.unmatched.contains(id));
                    }
                    self.summary.diagnostics += output.diagnostics.len();
                    sink.record(self.time_index, start, module.name(), output);
                }
                Err(e) => {
                    error!(module = module.name(), %start, "interval failed: {e}");
                    self.summary
                        .failed_steps
                        .push((module.name().to_string(), start, e));
                }
            }
        }

        self.time_index += 1;
        self.summary.steps += 1;
    }

    /// End the job of every module.
    ///
    /// Filtered ids that no module held during the run are reported here, once.
    pub fn finish(&mut self, sink: &mut dyn EmissionSink) {
        for module in self.modules.iter_mut() {
            module.end_job();
        }
        if self.started {
            self.report_unknown_sources(sink);
            sink.end_run();
        }
    }

    fn report_unknown_sources(&mut self, sink: &mut dyn EmissionSink) {
        if self.summary.steps == 0 {
            return;
        }
        let Some(unmatched) = self.unmatched.take() else {
            return;
        };
        for id in unmatched {
            let diagnostic = Diagnostic {
                module: MODEL_NAME.to_string(),
                source_id: id.clone(),
                timestamp: self.time_axis.start(),
                kind: DiagnosticKind::UnknownSource,
            };
            warn!("{diagnostic}");
            sink.report(diagnostic);
            self.summary.diagnostics += 1;
            self.summary.unknown_sources.push(id);
        }
    }

    /// Returns true if the model has no more time steps to process.
    pub fn finished(&self) -> bool {
        self.time_index >= self.time_axis.len()
    }

    /// Run every step of the time axis and close the modules.
    pub fn run(&mut self, sink: &mut dyn EmissionSink) -> RunSummary {
        self.start(sink);
        while !self.finished() {
            self.step(sink);
        }
        self.finish(sink);
        info!(
            steps = self.summary.steps,
            skipped = self.summary.skipped_modules.len(),
            diagnostics = self.summary.diagnostics,
            "run complete"
        );
        std::mem::take(&mut self.summary)
    }
}
