//! The source module abstraction.
//!
//! A [`SourceModule`] is the calculation stage of one source type. A run drives every
//! module through the same coarse lifecycle:
//!
//! ```text
//! Idle --begin_job--> Active --end_job--> Closed
//! ```
//!
//! While `Active` the module answers [`SourceModule::process`] calls for consecutive
//! intervals, turning the activity of each selected source into [`Emission`]s.
//! Failures that only concern one source are collected as [`Diagnostic`]s instead of
//! aborting the interval.

use crate::emission::{AccumulationReport, Emission};
use crate::emission_index::IndexUnit;
use crate::errors::{AlaqsError, AlaqsResult};
use crate::movement::Movement;
use crate::source::Source;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::{info, warn};

/// Filter sentinel selecting every in-study source
pub const ALL_SOURCES: &str = "all";

/// Lifecycle state of a source module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    #[default]
    Idle,
    Active,
    Closed,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleState::Idle => "idle",
            ModuleState::Active => "active",
            ModuleState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Selection of sources to process.
///
/// [`SourceFilter::All`] selects in-study sources only. [`SourceFilter::Only`] selects
/// exactly the listed ids, including sources flagged as not in study.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl SourceFilter {
    /// Build a filter from a list of ids.
    ///
    /// An empty list, or any list containing the `"all"` sentinel, selects all
    /// in-study sources.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() || ids.contains(ALL_SOURCES) {
            SourceFilter::All
        } else {
            SourceFilter::Only(ids)
        }
    }

    /// Select matching items, keeping the store order.
    ///
    /// Also returns the explicitly requested ids that were not found.
    pub fn select<'a, T, I>(&self, items: I) -> (Vec<&'a Arc<T>>, Vec<String>)
    where
        T: Selectable + 'a,
        I: IntoIterator<Item = &'a Arc<T>>,
    {
        match self {
            SourceFilter::All => (items.into_iter().filter(|x| x.in_study()).collect(), vec![]),
            SourceFilter::Only(ids) => {
                let selected: Vec<&'a Arc<T>> = items
                    .into_iter()
                    .filter(|x| ids.contains(x.id()))
                    .collect();
                let missing = ids
                    .iter()
                    .filter(|id| !selected.iter().any(|x| x.id() == id.as_str()))
                    .cloned()
                    .collect();
                (selected, missing)
            }
        }
    }
}

/// Anything a [`SourceFilter`] can select
pub trait Selectable {
    fn id(&self) -> &str;
    fn in_study(&self) -> bool;
}

impl Selectable for Source {
    fn id(&self) -> &str {
        &self.id
    }

    fn in_study(&self) -> bool {
        self.in_study
    }
}

impl Selectable for Movement {
    fn id(&self) -> &str {
        &self.id
    }

    fn in_study(&self) -> bool {
        self.in_study
    }
}

/// The entity an emission record originates from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceRef {
    Source(Arc<Source>),
    Movement(Arc<Movement>),
}

impl SourceRef {
    pub fn id(&self) -> &str {
        match self {
            SourceRef::Source(s) => &s.id,
            SourceRef::Movement(m) => &m.id,
        }
    }

    pub fn geometry_text(&self) -> &str {
        match self {
            SourceRef::Source(s) => &s.geometry_text,
            SourceRef::Movement(m) => &m.geometry_text,
        }
    }
}

/// Emissions of one source for one interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEmissions {
    /// Start of the interval
    pub timestamp: NaiveDateTime,
    pub source: SourceRef,
    pub emissions: Vec<Emission>,
}

impl SourceEmissions {
    /// Sum of all emission records of the source
    pub fn total(&self) -> Emission {
        let mut total = Emission::with_geometry(self.source.geometry_text());
        for emission in &self.emissions {
            total += emission;
        }
        total
    }
}

/// What went wrong with a single source
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// The emission index names a pollutant outside the frozen key set
    UnknownPollutant { key: String },
    /// The emission index holds a non-finite factor
    InvalidFactor { key: String },
    /// The emission index unit does not match the module's activity basis
    UnitMismatch { expected: IndexUnit, found: IndexUnit },
    /// A roadway without a usable length
    MissingLength,
    /// Fuel flow interpolation failed; the contribution was set to zero
    FuelFlow(AlaqsError),
    /// A filtered id that no active module holds, reported once per run by the model
    UnknownSource,
    /// Any other per-source calculation failure
    Calculation(AlaqsError),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownPollutant { key } => {
                write!(f, "unknown pollutant key '{key}' ignored")
            }
            DiagnosticKind::InvalidFactor { key } => {
                write!(f, "non-finite factor for '{key}' ignored")
            }
            DiagnosticKind::UnitMismatch { expected, found } => {
                write!(f, "emission index unit '{found}' where '{expected}' is required")
            }
            DiagnosticKind::MissingLength => write!(f, "no positive length_km for roadway"),
            DiagnosticKind::FuelFlow(e) => write!(f, "fuel flow unavailable, contribution zeroed: {e}"),
            DiagnosticKind::UnknownSource => write!(f, "requested source is not held by any module"),
            DiagnosticKind::Calculation(e) => write!(f, "source skipped: {e}"),
        }
    }
}

/// A per-source problem reported while processing an interval
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub module: String,
    pub source_id: String,
    pub timestamp: NaiveDateTime,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] source '{}' at {}: {}",
            self.module, self.source_id, self.timestamp, self.kind
        )
    }
}

/// Result of processing one interval
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    /// One entry per processed source, in store order
    pub records: Vec<SourceEmissions>,
    pub diagnostics: Vec<Diagnostic>,
    /// Explicitly requested ids this module's store does not hold.
    ///
    /// Not a problem on its own: the id may belong to another module. The model
    /// decides which ids are unknown to the whole run.
    pub unmatched: Vec<String>,
}

impl ProcessOutput {
    /// Record a diagnostic and log it
    pub fn report(
        &mut self,
        module: &str,
        source_id: &str,
        timestamp: NaiveDateTime,
        kind: DiagnosticKind,
    ) {
        let diagnostic = Diagnostic {
            module: module.to_string(),
            source_id: source_id.to_string(),
            timestamp,
            kind,
        };
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Report every key an accumulation could not use
    pub fn report_accumulation(
        &mut self,
        module: &str,
        source_id: &str,
        timestamp: NaiveDateTime,
        report: AccumulationReport,
    ) {
        for key in report.unknown_keys {
            self.report(module, source_id, timestamp, DiagnosticKind::UnknownPollutant { key });
        }
        for key in report.invalid_keys {
            self.report(module, source_id, timestamp, DiagnosticKind::InvalidFactor { key });
        }
    }
}

/// A per-source-type emission calculation stage.
///
/// Implementations are registered with `typetag` so a run configuration can list
/// them as tagged tables (`type = "AreaSourceModule"`).
#[typetag::serde(tag = "type")]
pub trait SourceModule: Debug + Send + Sync {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Disabled modules are skipped by the driving model
    fn is_enabled(&self) -> bool {
        true
    }

    fn state(&self) -> ModuleState;

    /// Open the backing store and move from `Idle` to `Active`.
    ///
    /// Fails with [`AlaqsError::Configuration`] if the store cannot be opened and with
    /// [`AlaqsError::InvalidState`] if the module is not idle.
    fn begin_job(&mut self) -> AlaqsResult<()>;

    /// Compute the emissions of the selected sources for `[start, end)`.
    fn process(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        filter: &SourceFilter,
    ) -> AlaqsResult<ProcessOutput>;

    /// Release the store and move to `Closed`. Calling it again has no effect.
    fn end_job(&mut self);
}

/// Lifecycle bookkeeping shared by the source modules.
///
/// Holds the state machine and the store while the job is active. A store can be
/// injected up front; otherwise one is opened when the job begins.
#[derive(Debug, Clone)]
pub struct JobState<S> {
    state: ModuleState,
    injected: Option<Arc<S>>,
    store: Option<Arc<S>>,
}

impl<S> Default for JobState<S> {
    fn default() -> Self {
        Self {
            state: ModuleState::Idle,
            injected: None,
            store: None,
        }
    }
}

impl<S> JobState<S> {
    /// Use `store` for the next job instead of opening one
    pub fn with_store(store: S) -> Self {
        Self {
            injected: Some(Arc::new(store)),
            ..Self::default()
        }
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    pub fn begin<F>(&mut self, module: &str, open: F) -> AlaqsResult<()>
    where
        F: FnOnce() -> AlaqsResult<S>,
    {
        if self.state != ModuleState::Idle {
            return Err(self.invalid_state(module, "begin a job"));
        }
        let store = match self.injected.take() {
            Some(store) => store,
            None => Arc::new(open()?),
        };
        self.store = Some(store);
        self.state = ModuleState::Active;
        info!(module = module, "job started");
        Ok(())
    }

    /// The store of the active job
    pub fn store(&self, module: &str) -> AlaqsResult<&Arc<S>> {
        match (&self.state, &self.store) {
            (ModuleState::Active, Some(store)) => Ok(store),
            _ => Err(self.invalid_state(module, "process")),
        }
    }

    pub fn end(&mut self, module: &str) {
        if self.state != ModuleState::Closed {
            info!(module = module, "job finished");
        }
        self.store = None;
        self.injected = None;
        self.state = ModuleState::Closed;
    }

    fn invalid_state(&self, module: &str, operation: &str) -> AlaqsError {
        AlaqsError::InvalidState {
            module: module.to_string(),
            operation: operation.to_string(),
            state: self.state.to_string(),
        }
    }
}
