//! A model drives a set of source modules over a common time axis.
//!
//! Every enabled module begins its job before the first step. A module that cannot
//! open its store is skipped for the rest of the run and reported in the
//! [`RunSummary`]. Each step hands the interval `[t, t + step)` to every active module
//! and passes the results to an [`EmissionSink`], the output stage of the run.
//! Intervals never overlap and always increase. Once the time axis is exhausted every
//! module ends its job.
//!
//! An explicit source filter is shared by every module, so each module only reports
//! back the listed ids it does not hold. An id that no module holds is reported once,
//! when the run finishes.

mod builder;
mod runtime;
mod time_axis;

#[cfg(test)]
mod tests;

pub use builder::EmissionModelBuilder;
pub use runtime::{EmissionModel, EmissionSink, RunSummary, MODEL_NAME};
pub use time_axis::TimeAxis;
