//! Stationary and road sources with annual activity.

use crate::emission_index::EmissionIndex;
use crate::profile::TemporalProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A source record as persisted by the external store.
///
/// Profiles and the emission index are referenced by name and resolved by
/// [`crate::store::SourceStore`] when the record is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    /// Annual activity: units, vehicles or operations per year
    #[serde(alias = "ops_per_year", default)]
    pub units_per_year: f64,
    /// Release height
    /// unit: m
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub hour_profile: Option<String>,
    #[serde(default)]
    pub daily_profile: Option<String>,
    #[serde(default)]
    pub month_profile: Option<String>,
    pub emission_index: String,
    #[serde(default)]
    pub geometry_text: String,
    #[serde(default = "default_in_study")]
    pub in_study: bool,
    /// Length of a roadway link
    /// unit: km
    #[serde(default)]
    pub length_km: Option<f64>,
}

fn default_in_study() -> bool {
    true
}

/// A source with its temporal profile and emission index resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub units_per_year: f64,
    pub height: f64,
    pub hour_profile: Option<String>,
    pub daily_profile: Option<String>,
    pub month_profile: Option<String>,
    pub profile: TemporalProfile,
    pub emission_index: Arc<EmissionIndex>,
    pub geometry_text: String,
    pub in_study: bool,
    pub length_km: Option<f64>,
}

impl Source {
    /// A source with a flat profile, mostly useful for building stores in code
    pub fn new(id: impl Into<String>, units_per_year: f64, emission_index: Arc<EmissionIndex>) -> Self {
        Self {
            id: id.into(),
            units_per_year,
            height: 0.0,
            hour_profile: None,
            daily_profile: None,
            month_profile: None,
            profile: TemporalProfile::flat(),
            emission_index,
            geometry_text: String::new(),
            in_study: true,
            length_km: None,
        }
    }

    pub fn with_profile(self, profile: TemporalProfile) -> Self {
        Self { profile, ..self }
    }

    pub fn with_geometry(self, geometry_text: impl Into<String>) -> Self {
        Self {
            geometry_text: geometry_text.into(),
            ..self
        }
    }

    pub fn with_height(self, height: f64) -> Self {
        Self { height, ..self }
    }

    pub fn with_length_km(self, length_km: f64) -> Self {
        Self {
            length_km: Some(length_km),
            ..self
        }
    }

    pub fn with_in_study(self, in_study: bool) -> Self {
        Self { in_study, ..self }
    }

    /// Operations per year, the activity basis of point sources
    pub fn ops_per_year(&self) -> f64 {
        self.units_per_year
    }
}
