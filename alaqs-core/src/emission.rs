//! Per-pollutant mass accumulation.

use crate::emission_index::{FactorTable, IndexUnit};
use crate::pollutants::{Pollutant, POLLUTANT_COUNT};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Pollutant masses, in kilograms, emitted by one source over one interval.
///
/// All accumulators start at zero and only ever grow through [`Emission::add`] and
/// [`Emission::add_generic`], so several contributions can be folded into the same
/// record within a single interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    values: [f64; POLLUTANT_COUNT],
    geometry_text: String,
}

/// Keys of an emission index that could not be accumulated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulationReport {
    /// Keys outside the frozen pollutant set
    pub unknown_keys: Vec<String>,
    /// Known keys whose factor was not a finite number
    pub invalid_keys: Vec<String>,
}

impl AccumulationReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_keys.is_empty() && self.invalid_keys.is_empty()
    }
}

impl Emission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(geometry_text: impl Into<String>) -> Self {
        Self {
            values: [0.0; POLLUTANT_COUNT],
            geometry_text: geometry_text.into(),
        }
    }

    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.values[pollutant.index()]
    }

    /// Add a mass in kilograms to one accumulator
    pub fn add(&mut self, pollutant: Pollutant, kg: f64) {
        self.values[pollutant.index()] += kg;
    }

    /// Accumulate `factor * multiplier` for every factor of an emission index table.
    ///
    /// Factors are converted to kilograms according to `unit`. Keys outside the
    /// frozen pollutant set and non-finite factors are skipped and returned in the
    /// report so the caller can surface them.
    pub fn add_generic(
        &mut self,
        factors: &FactorTable,
        multiplier: f64,
        unit: IndexUnit,
    ) -> AccumulationReport {
        let mut report = AccumulationReport::default();
        let to_kg = unit.to_kg();

        for (key, factor) in factors {
            match Pollutant::from_key(key) {
                Some(_) if !factor.is_finite() => report.invalid_keys.push(key.clone()),
                Some(pollutant) => self.add(pollutant, factor * multiplier * to_kg),
                None => report.unknown_keys.push(key.clone()),
            }
        }

        report
    }

    pub fn geometry_text(&self) -> &str {
        &self.geometry_text
    }

    pub fn set_geometry(&mut self, geometry_text: impl Into<String>) {
        self.geometry_text = geometry_text.into();
    }

    /// Iterate over `(pollutant, kg)` pairs in the canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL.into_iter().map(|p| (p, self.get(p)))
    }

    pub fn values(&self) -> &[f64; POLLUTANT_COUNT] {
        &self.values
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn fuel_kg(&self) -> f64 {
        self.get(Pollutant::Fuel)
    }

    pub fn co2_kg(&self) -> f64 {
        self.get(Pollutant::CO2)
    }

    pub fn co_kg(&self) -> f64 {
        self.get(Pollutant::CO)
    }

    pub fn hc_kg(&self) -> f64 {
        self.get(Pollutant::HC)
    }

    pub fn nox_kg(&self) -> f64 {
        self.get(Pollutant::NOx)
    }

    pub fn sox_kg(&self) -> f64 {
        self.get(Pollutant::SOx)
    }

    pub fn pm10_kg(&self) -> f64 {
        self.get(Pollutant::PM10)
    }

    pub fn p1_kg(&self) -> f64 {
        self.get(Pollutant::P1)
    }

    pub fn p2_kg(&self) -> f64 {
        self.get(Pollutant::P2)
    }

    pub fn pm10_prefoa3_kg(&self) -> f64 {
        self.get(Pollutant::PM10PreFOA3)
    }

    pub fn pm10_nonvol_kg(&self) -> f64 {
        self.get(Pollutant::PM10NonVolatile)
    }

    pub fn pm10_sul_kg(&self) -> f64 {
        self.get(Pollutant::PM10Sulphur)
    }

    pub fn pm10_organic_kg(&self) -> f64 {
        self.get(Pollutant::PM10Organic)
    }
}

impl AddAssign<&Emission> for Emission {
    /// Adds the masses of another record; the geometry is left untouched.
    fn add_assign(&mut self, rhs: &Emission) {
        for (lhs, rhs) in self.values.iter_mut().zip(rhs.values.iter()) {
            *lhs += rhs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use is_close::is_close;

    fn factors() -> FactorTable {
        IndexMap::from([
            ("co_kg".to_string(), 10.0),
            ("nox_kg".to_string(), 2.5),
            ("pm10_kg".to_string(), 0.125),
        ])
    }

    #[test]
    fn starts_at_zero() {
        let emission = Emission::new();
        assert!(emission.is_zero());
        assert_eq!(emission.iter().count(), 13);
    }

    #[test]
    fn add_generic_converts_grams() {
        let mut emission = Emission::new();
        let report = emission.add_generic(&factors(), 4.0, IndexUnit::GramsPerVehicle);

        assert!(report.is_clean());
        assert!(is_close!(emission.co_kg(), 0.04));
        assert!(is_close!(emission.nox_kg(), 0.01));
        assert!(is_close!(emission.pm10_kg(), 0.0005));
        assert_eq!(emission.hc_kg(), 0.0);
    }

    #[test]
    fn add_generic_is_additive() {
        let (m1, m2) = (3.7, 11.2);

        let mut twice = Emission::new();
        twice.add_generic(&factors(), m1, IndexUnit::KilogramsPerUnit);
        twice.add_generic(&factors(), m2, IndexUnit::KilogramsPerUnit);

        let mut once = Emission::new();
        once.add_generic(&factors(), m1 + m2, IndexUnit::KilogramsPerUnit);

        for ((pollutant, a), (_, b)) in twice.iter().zip(once.iter()) {
            assert!(is_close!(a, b), "{pollutant}: {a} vs {b}");
        }
    }

    #[test]
    fn unknown_and_invalid_keys_are_reported() {
        let mut table = factors();
        table.insert("benzene_kg".to_string(), 1.0);
        table.insert("hc_kg".to_string(), f64::NAN);

        let mut emission = Emission::new();
        let report = emission.add_generic(&table, 1.0, IndexUnit::KilogramsPerUnit);

        assert_eq!(report.unknown_keys, vec!["benzene_kg".to_string()]);
        assert_eq!(report.invalid_keys, vec!["hc_kg".to_string()]);
        // Recognised keys still accumulate
        assert_eq!(emission.co_kg(), 10.0);
        assert_eq!(emission.hc_kg(), 0.0);
    }

    #[test]
    fn add_assign_keeps_geometry() {
        let mut total = Emission::with_geometry("POINT (1 2)");
        let mut other = Emission::with_geometry("POINT (3 4)");
        other.add(Pollutant::Fuel, 2.0);

        total += &other;
        total += &other;

        assert_eq!(total.fuel_kg(), 4.0);
        assert_eq!(total.geometry_text(), "POINT (1 2)");
    }
}
