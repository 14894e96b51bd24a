//! In-memory stores of sources and movements.
//!
//! A store is loaded once, when a module begins its job, from a TOML document written by
//! the external persistence layer, or is built in code and injected into the module.
//! Stores are read-only afterwards and are shared between the module and its output
//! records through `Arc`.
//!
//! ```toml
//! [profiles.hour]
//! office = [0.1, 0.1, 0.1, 0.1, 0.1, 0.5, 1.0, 2.0, 2.0, 1.5, 1.0, 1.0,
//!           1.0, 1.0, 1.0, 1.5, 2.0, 2.0, 1.0, 0.5, 0.3, 0.2, 0.1, 0.1]
//!
//! [[emission_indices]]
//! name = "passenger cars"
//! unit = "gm_km"
//! factors = { co_kg = 10.0, nox_kg = 0.4 }
//!
//! [[sources]]
//! id = "ROAD-01"
//! units_per_year = 8760
//! hour_profile = "office"
//! emission_index = "passenger cars"
//! length_km = 2.0
//! geometry_text = "LINESTRING (0 0, 2000 0)"
//! ```

use crate::emission_index::EmissionIndex;
use crate::errors::{AlaqsError, AlaqsResult};
use crate::movement::{AircraftEngine, Movement, MovementRecord};
use crate::profile::ProfileLibrary;
use crate::source::{Source, SourceRecord};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Read and parse a TOML document, reporting any failure as a configuration error
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> AlaqsResult<T> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AlaqsError::Configuration(format!("cannot read '{}': {e}", path.display()))
    })?;
    toml::from_str(&contents).map_err(|e| {
        AlaqsError::Configuration(format!("cannot parse '{}': {e}", path.display()))
    })
}

/// Persisted layout of a source store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceStoreDocument {
    pub profiles: ProfileLibrary,
    pub emission_indices: Vec<EmissionIndex>,
    pub sources: Vec<SourceRecord>,
}

/// Sources keyed by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStore {
    sources: IndexMap<String, Arc<Source>>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and resolve a store document from disk
    pub fn open(path: &Path) -> AlaqsResult<Self> {
        let document: SourceStoreDocument = read_toml(path)?;
        Self::from_document(document)
    }

    /// Resolve profile and emission index references of every record
    ///
    /// Any invalid record fails the whole document with a configuration error naming
    /// the source.
    pub fn from_document(document: SourceStoreDocument) -> AlaqsResult<Self> {
        let indices: IndexMap<String, Arc<EmissionIndex>> = document
            .emission_indices
            .into_iter()
            .map(|index| (index.name.clone(), Arc::new(index)))
            .collect();

        let mut store = Self::new();
        for record in document.sources {
            let index = indices.get(&record.emission_index).ok_or_else(|| {
                AlaqsError::Configuration(format!(
                    "source '{}' references unknown emission index '{}'",
                    record.id, record.emission_index
                ))
            })?;
            let profile = document
                .profiles
                .resolve(
                    record.hour_profile.as_deref(),
                    record.daily_profile.as_deref(),
                    record.month_profile.as_deref(),
                )
                .map_err(|e| match e {
                    AlaqsError::Configuration(msg) => {
                        AlaqsError::Configuration(format!("source '{}': {msg}", record.id))
                    }
                    other => AlaqsError::Configuration(format!("source '{}': {other}", record.id)),
                })?;
            if !record.units_per_year.is_finite() || record.units_per_year < 0.0 {
                return Err(AlaqsError::Configuration(format!(
                    "source '{}' has invalid annual activity {}",
                    record.id, record.units_per_year
                )));
            }

            store.insert(Source {
                id: record.id,
                units_per_year: record.units_per_year,
                height: record.height,
                hour_profile: record.hour_profile,
                daily_profile: record.daily_profile,
                month_profile: record.month_profile,
                profile,
                emission_index: Arc::clone(index),
                geometry_text: record.geometry_text,
                in_study: record.in_study,
                length_km: record.length_km,
            })?;
        }
        Ok(store)
    }

    /// Add a source
    ///
    /// Ids are unique within a store; a duplicate is a configuration error.
    pub fn insert(&mut self, source: Source) -> AlaqsResult<()> {
        if self.sources.contains_key(&source.id) {
            return Err(AlaqsError::Configuration(format!(
                "duplicate source id '{}'",
                source.id
            )));
        }
        self.sources.insert(source.id.clone(), Arc::new(source));
        Ok(())
    }

    pub fn with_source(mut self, source: Source) -> AlaqsResult<Self> {
        self.insert(source)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Source>> {
        self.sources.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Source>> {
        self.sources.values()
    }
}

/// Persisted layout of a movement store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementStoreDocument {
    pub engines: Vec<AircraftEngine>,
    pub movements: Vec<MovementRecord>,
}

/// Aircraft movements keyed by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementStore {
    movements: IndexMap<String, Arc<Movement>>,
}

impl MovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> AlaqsResult<Self> {
        let document: MovementStoreDocument = read_toml(path)?;
        Self::from_document(document)
    }

    /// Resolve the engine of every movement, checking engine data and overrides.
    pub fn from_document(document: MovementStoreDocument) -> AlaqsResult<Self> {
        let mut engines: IndexMap<String, Arc<AircraftEngine>> = IndexMap::new();
        for engine in document.engines {
            validate_engine(&engine)?;
            engines.insert(engine.name.clone(), Arc::new(engine));
        }

        let mut store = Self::new();
        for record in document.movements {
            let engine = engines.get(&record.engine).ok_or_else(|| {
                AlaqsError::Configuration(format!(
                    "movement '{}' references unknown engine '{}'",
                    record.id, record.engine
                ))
            })?;
            validate_movement(&record)?;

            store.insert(Movement {
                id: record.id,
                time: record.time,
                kind: record.kind,
                engine_count: record.engine_count.unwrap_or(engine.engine_count),
                engine: Arc::clone(engine),
                taxi_time_s: record.taxi_time_s,
                power_settings: record.power_settings,
                geometry_text: record.geometry_text,
                mode_geometry: record.mode_geometry,
                in_study: record.in_study,
            })?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, movement: Movement) -> AlaqsResult<()> {
        if self.movements.contains_key(&movement.id) {
            return Err(AlaqsError::Configuration(format!(
                "duplicate movement id '{}'",
                movement.id
            )));
        }
        self.movements
            .insert(movement.id.clone(), Arc::new(movement));
        Ok(())
    }

    pub fn with_movement(mut self, movement: Movement) -> AlaqsResult<Self> {
        self.insert(movement)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Movement>> {
        self.movements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.movements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Movement>> {
        self.movements.values()
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_engine(engine: &AircraftEngine) -> AlaqsResult<()> {
    let invalid = |what: &str, value: f64| {
        AlaqsError::Configuration(format!(
            "engine '{}' has invalid {what} {value}",
            engine.name
        ))
    };
    if !non_negative(engine.bypass_ratio) {
        return Err(invalid("bypass ratio", engine.bypass_ratio));
    }
    for (mode, value) in &engine.fuel_flow {
        if !non_negative(*value) {
            return Err(invalid(&format!("{mode} fuel flow"), *value));
        }
    }
    for (mode, value) in &engine.smoke_number {
        if !non_negative(*value) {
            return Err(invalid(&format!("{mode} smoke number"), *value));
        }
    }
    Ok(())
}

fn validate_movement(record: &MovementRecord) -> AlaqsResult<()> {
    let invalid = |what: &str, value: f64| {
        AlaqsError::Configuration(format!(
            "movement '{}' has invalid {what} {value}",
            record.id
        ))
    };
    if let Some(taxi_time_s) = record.taxi_time_s {
        if !non_negative(taxi_time_s) {
            return Err(invalid("taxi time", taxi_time_s));
        }
    }
    for (mode, value) in &record.power_settings {
        if !non_negative(*value) {
            return Err(invalid(&format!("{mode} power setting"), *value));
        }
    }
    Ok(())
}
