#![allow(dead_code)]

use crate::emission::Emission;
use crate::errors::{AlaqsError, AlaqsResult};
use crate::module::{
    JobState, ModuleState, ProcessOutput, SourceEmissions, SourceFilter, SourceModule, SourceRef,
};
use crate::store::SourceStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimal module spreading each source's annual activity with its profile and
/// applying the generic factors as kilograms per unit.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct TestSourceModule {
    pub store_path: Option<PathBuf>,
    #[serde(default = "enabled")]
    pub enable: bool,
    #[serde(skip)]
    job: JobState<SourceStore>,
}

fn enabled() -> bool {
    true
}

impl TestSourceModule {
    pub fn with_store(store: SourceStore) -> Self {
        Self {
            store_path: None,
            enable: true,
            job: JobState::with_store(store),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: Some(path.into()),
            enable: true,
            job: JobState::default(),
        }
    }
}

#[typetag::serde]
impl SourceModule for TestSourceModule {
    fn name(&self) -> &str {
        "TestSource"
    }

    fn is_enabled(&self) -> bool {
        self.enable
    }

    fn state(&self) -> ModuleState {
        self.job.state()
    }

    fn begin_job(&mut self) -> AlaqsResult<()> {
        let path = self.store_path.clone();
        self.job.begin("TestSource", || match path {
            Some(path) => SourceStore::open(&path),
            None => Err(AlaqsError::Configuration("no store path".to_string())),
        })
    }

    fn process(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        filter: &SourceFilter,
    ) -> AlaqsResult<ProcessOutput> {
        let store = self.job.store(self.name())?;
        let (selected, missing) = filter.select(store.iter());

        let mut output = ProcessOutput::default();
        output.unmatched = missing;
        for source in selected {
            let multiplier = source
                .profile
                .activity_multiplier(source.units_per_year, start, end)?;
            let mut emission = Emission::with_geometry(source.geometry_text.clone());
            let report = emission.add_generic(
                &source.emission_index.factors,
                multiplier,
                source.emission_index.unit,
            );
            output.report_accumulation(self.name(), &source.id, start, report);
            output.records.push(SourceEmissions {
                timestamp: start,
                source: SourceRef::Source(source.clone()),
                emissions: vec![emission],
            });
        }
        Ok(output)
    }

    fn end_job(&mut self) {
        self.job.end("TestSource");
    }
}
