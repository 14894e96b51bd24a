//! Temporal allocation of annual activity.
//!
//! A [`TemporalProfile`] holds three independent relative-weight curves: 24 hour-of-day
//! weights, 7 day-of-week weights (Monday first) and 12 month-of-year weights.
//! The curves are never normalised individually. Instead the fraction of the annual
//! activity assigned to one clock hour `t` is
//!
//! $$ f(t) = \frac{w_h(t) \cdot w_d(t) \cdot w_m(t)}{N(y)} $$
//!
//! where the yearly normalisation $N(y)$ is the sum of the same product over every hour
//! of the calendar year $y$ containing `t`:
//!
//! $$ N(y) = \left(\sum_{k=0}^{23} w_h[k]\right) \sum_{d \in y} w_d(d) \cdot w_m(d) $$
//!
//! Summing $A \cdot f(t)$ over all hours of a year therefore reproduces the annual
//! activity $A$ exactly, for any valid profile and for leap years alike.
//!
//! Timestamps are naive local times; daylight saving transitions are not modelled.

use crate::errors::{AlaqsError, AlaqsResult};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_WEEK: usize = 7;
pub const MONTHS_PER_YEAR: usize = 12;

const MILLISECONDS_PER_HOUR: f64 = 3_600_000.0;

/// Hour, day and month relative activity weights.
///
/// Deserialising goes through [`TemporalProfile::new`], so invalid curves are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileCurves")]
pub struct TemporalProfile {
    hourly: [f64; HOURS_PER_DAY],
    daily: [f64; DAYS_PER_WEEK],
    monthly: [f64; MONTHS_PER_YEAR],
}

/// Unchecked curves as they appear in a document
#[derive(Deserialize)]
struct ProfileCurves {
    hourly: [f64; HOURS_PER_DAY],
    daily: [f64; DAYS_PER_WEEK],
    monthly: [f64; MONTHS_PER_YEAR],
}

impl TryFrom<ProfileCurves> for TemporalProfile {
    type Error = AlaqsError;

    fn try_from(curves: ProfileCurves) -> AlaqsResult<Self> {
        Self::new(curves.hourly, curves.daily, curves.monthly)
    }
}

impl Default for TemporalProfile {
    fn default() -> Self {
        Self::flat()
    }
}

impl TemporalProfile {
    /// Build a profile, checking that every weight is finite and non-negative and
    /// that each curve has a positive sum.
    pub fn new(
        hourly: [f64; HOURS_PER_DAY],
        daily: [f64; DAYS_PER_WEEK],
        monthly: [f64; MONTHS_PER_YEAR],
    ) -> AlaqsResult<Self> {
        validate_curve("hourly", &hourly)?;
        validate_curve("daily", &daily)?;
        validate_curve("monthly", &monthly)?;
        Ok(Self {
            hourly,
            daily,
            monthly,
        })
    }

    /// Uniform activity over the whole year
    pub fn flat() -> Self {
        Self {
            hourly: [1.0; HOURS_PER_DAY],
            daily: [1.0; DAYS_PER_WEEK],
            monthly: [1.0; MONTHS_PER_YEAR],
        }
    }

    pub fn hourly(&self) -> &[f64; HOURS_PER_DAY] {
        &self.hourly
    }

    pub fn daily(&self) -> &[f64; DAYS_PER_WEEK] {
        &self.daily
    }

    pub fn monthly(&self) -> &[f64; MONTHS_PER_YEAR] {
        &self.monthly
    }

    /// Un-normalised weight `wh * wd * wm` of the clock hour containing `t`
    pub fn weight(&self, t: NaiveDateTime) -> f64 {
        self.hourly[t.hour() as usize]
            * self.daily[t.weekday().num_days_from_monday() as usize]
            * self.monthly[t.month0() as usize]
    }

    /// Sum of [`TemporalProfile::weight`] over every hour of `year`
    pub fn annual_weight(&self, year: i32) -> f64 {
        let hour_sum: f64 = self.hourly.iter().sum();

        let mut day_sum = 0.0;
        let mut day = NaiveDate::from_ymd_opt(year, 1, 1);
        while let Some(d) = day {
            if d.year() != year {
                break;
            }
            day_sum += self.daily[d.weekday().num_days_from_monday() as usize]
                * self.monthly[d.month0() as usize];
            day = d.succ_opt();
        }

        hour_sum * day_sum
    }

    /// Fraction of the annual activity falling in the clock hour containing `t`
    pub fn hourly_fraction(&self, t: NaiveDateTime) -> f64 {
        let norm = self.annual_weight(t.year());
        if norm > 0.0 {
            self.weight(t) / norm
        } else {
            0.0
        }
    }

    /// Activity assigned to the interval `[start, end)` given an annual activity.
    ///
    /// The interval is split on clock-hour boundaries; each partial hour contributes
    /// in proportion to the share of the hour it covers.
    pub fn activity_multiplier(
        &self,
        annual_activity: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AlaqsResult<f64> {
        if end <= start {
            return Err(AlaqsError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let into_hour = Duration::seconds(i64::from(start.minute() * 60 + start.second()))
            + Duration::nanoseconds(i64::from(start.nanosecond()));
        let mut bucket_start = start - into_hour;

        let mut norm_cache: Option<(i32, f64)> = None;
        let mut fraction = 0.0;

        while bucket_start < end {
            let bucket_end = bucket_start + Duration::hours(1);
            let overlap = bucket_end.min(end) - bucket_start.max(start);
            let share = overlap.num_milliseconds() as f64 / MILLISECONDS_PER_HOUR;

            let year = bucket_start.year();
            let norm = match norm_cache {
                Some((cached_year, value)) if cached_year == year => value,
                _ => {
                    let value = self.annual_weight(year);
                    norm_cache = Some((year, value));
                    value
                }
            };
            if norm > 0.0 {
                fraction += self.weight(bucket_start) * share / norm;
            }

            bucket_start = bucket_end;
        }

        Ok(annual_activity * fraction)
    }
}

fn validate_curve(curve: &str, weights: &[f64]) -> AlaqsResult<()> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(AlaqsError::InvalidProfile {
            name: curve.to_string(),
            reason: format!("weight {w} is not a finite non-negative number"),
        });
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(AlaqsError::InvalidProfile {
            name: curve.to_string(),
            reason: "weights sum to zero".to_string(),
        });
    }
    Ok(())
}

/// Named hour, day and month curves shared by the sources of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileLibrary {
    pub hour: IndexMap<String, Vec<f64>>,
    pub day: IndexMap<String, Vec<f64>>,
    pub month: IndexMap<String, Vec<f64>>,
}

impl ProfileLibrary {
    /// Combine three named curves into a profile.
    ///
    /// A curve that is not named falls back to a flat curve. A name that is not in the
    /// library, or a curve of the wrong length, is a configuration error.
    pub fn resolve(
        &self,
        hour: Option<&str>,
        day: Option<&str>,
        month: Option<&str>,
    ) -> AlaqsResult<TemporalProfile> {
        let hourly = lookup::<HOURS_PER_DAY>(&self.hour, "hour", hour)?;
        let daily = lookup::<DAYS_PER_WEEK>(&self.day, "day", day)?;
        let monthly = lookup::<MONTHS_PER_YEAR>(&self.month, "month", month)?;

        TemporalProfile::new(hourly, daily, monthly).map_err(|e| match e {
            AlaqsError::InvalidProfile { name, reason } => AlaqsError::InvalidProfile {
                name: format!(
                    "{}/{}/{} ({name})",
                    hour.unwrap_or("flat"),
                    day.unwrap_or("flat"),
                    month.unwrap_or("flat")
                ),
                reason,
            },
            other => other,
        })
    }
}

fn lookup<const N: usize>(
    curves: &IndexMap<String, Vec<f64>>,
    kind: &str,
    name: Option<&str>,
) -> AlaqsResult<[f64; N]> {
    let Some(name) = name else {
        return Ok([1.0; N]);
    };
    let curve = curves.get(name).ok_or_else(|| {
        AlaqsError::Configuration(format!("unknown {kind} profile '{name}'"))
    })?;
    <[f64; N]>::try_from(curve.as_slice()).map_err(|_| AlaqsError::InvalidProfile {
        name: name.to_string(),
        reason: format!("expected {N} {kind} weights, found {}", curve.len()),
    })
}
