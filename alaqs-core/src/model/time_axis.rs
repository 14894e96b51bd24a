//! Interval sequence of a run.

use crate::errors::{AlaqsError, AlaqsResult};
use chrono::{Duration, NaiveDateTime};

/// Consecutive `[start, end)` intervals of equal length covering a period.
///
/// The last interval is shortened so that it ends exactly at the end of the period.
/// Steps are counted in whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
}

impl TimeAxis {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: Duration) -> AlaqsResult<Self> {
        if end <= start {
            return Err(AlaqsError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if step.num_milliseconds() <= 0 {
            return Err(AlaqsError::InvalidInput(format!(
                "time step must be at least one millisecond, got {step}"
            )));
        }
        let step = Duration::milliseconds(step.num_milliseconds());
        Ok(Self { start, end, step })
    }

    /// Hourly intervals
    pub fn hourly(start: NaiveDateTime, end: NaiveDateTime) -> AlaqsResult<Self> {
        Self::new(start, end, Duration::hours(1))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Number of intervals
    pub fn len(&self) -> usize {
        let period = (self.end - self.start).num_milliseconds();
        let step = self.step.num_milliseconds();
        let count = period / step + i64::from(period % step != 0);
        usize::try_from(count).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds of the interval at `index`
    pub fn bounds(&self, index: usize) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if index >= self.len() {
            return None;
        }
        let offset = i64::try_from(index)
            .ok()
            .and_then(|i| self.step.num_milliseconds().checked_mul(i))
            .and_then(Duration::try_milliseconds)?;
        let start = self.start.checked_add_signed(offset)?;
        let end = start
            .checked_add_signed(self.step)
            .map_or(self.end, |end| end.min(self.end));
        Some((start, end))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, NaiveDateTime)> + '_ {
        (0..self.len()).filter_map(move |i| self.bounds(i))
    }
}
