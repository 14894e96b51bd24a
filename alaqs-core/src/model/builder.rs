//! Model builder for assembling a run from modules.

use crate::errors::{AlaqsError, AlaqsResult};
use crate::module::{SourceFilter, SourceModule};
use chrono::{Duration, NaiveDateTime};

use super::runtime::EmissionModel;
use super::time_axis::TimeAxis;

/// Build a new model from a set of source modules.
#[derive(Debug, Default)]
pub struct EmissionModelBuilder {
    modules: Vec<Box<dyn SourceModule>>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    step: Option<Duration>,
    filter: SourceFilter,
}

impl EmissionModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period of the run
    pub fn with_period(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Length of each interval; defaults to one hour
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_filter(mut self, filter: SourceFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_module(mut self, module: Box<dyn SourceModule>) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_modules(mut self, modules: Vec<Box<dyn SourceModule>>) -> Self {
        self.modules.extend(modules);
        self
    }

    pub fn build(self) -> AlaqsResult<EmissionModel> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(AlaqsError::Configuration(
                "the run period has not been set".to_string(),
            ));
        };
        let time_axis = TimeAxis::new(start, end, self.step.unwrap_or_else(|| Duration::hours(1)))?;
        Ok(EmissionModel::new(self.modules, time_axis, self.filter))
    }
}
