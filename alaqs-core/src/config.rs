//! Run configuration.
//!
//! A run is described by a TOML document listing the period, the interval length, the
//! source filter and the modules to drive. Modules are tagged with their type name:
//!
//! ```toml
//! start = "2023-01-01T00:00:00"
//! end = "2024-01-01T00:00:00"
//! step_minutes = 60
//! sources = ["all"]
//!
//! [[modules]]
//! type = "RoadwaySourceModule"
//! store_path = "stores/roadways.toml"
//!
//! [[modules]]
//! type = "MovementSourceModule"
//! store_path = "stores/movements.toml"
//! enable = false
//! ```

use crate::errors::{AlaqsError, AlaqsResult};
use crate::model::{EmissionModel, EmissionModelBuilder};
use crate::module::{SourceFilter, SourceModule};
use crate::store::read_toml;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_step_minutes() -> i64 {
    60
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Length of each interval
    /// unit: min
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
    /// Source ids to process; empty or containing "all" selects every in-study source
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub modules: Vec<Box<dyn SourceModule>>,
}

impl RunConfig {
    pub fn open(path: &Path) -> AlaqsResult<Self> {
        read_toml(path)
    }

    pub fn from_toml_str(contents: &str) -> AlaqsResult<Self> {
        toml::from_str(contents)
            .map_err(|e| AlaqsError::Configuration(format!("invalid run configuration: {e}")))
    }

    pub fn filter(&self) -> SourceFilter {
        SourceFilter::from_ids(self.sources.iter().cloned())
    }

    /// Build the model described by this configuration
    pub fn into_model(self) -> AlaqsResult<EmissionModel> {
        let step = Duration::try_minutes(self.step_minutes)
            .filter(|step| *step > Duration::zero())
            .ok_or_else(|| {
                AlaqsError::Configuration(format!(
                    "step_minutes must be a positive number of minutes, got {}",
                    self.step_minutes
                ))
            })?;
        let filter = self.filter();
        EmissionModelBuilder::new()
            .with_period(self.start, self.end)
            .with_step(step)
            .with_filter(filter)
            .with_modules(self.modules)
            .build()
    }
}
