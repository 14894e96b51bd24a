//! ICAO Doc 9889 First Order Approximation of aircraft engine particulate matter.
//!
//! Estimates the non-volatile, fuel-sulphur and volatile organic PM emission indices of
//! a turbofan or turbojet at one LTO mode from its certification smoke number.
//!
//! 1. Concentration index from the smoke number $SN$:
//!    $$ CI = \begin{cases} 0.06949 \cdot SN^{1.234} & SN \le 30 \\
//!       0.0297 \cdot SN^2 - 1.803 \cdot SN + 31.94 & SN > 30 \end{cases} $$
//! 2. Exhaust volumetric flow from the mode air-fuel ratio $AFR$ and bypass ratio $BPR$:
//!    $$ Q = \begin{cases} 0.776 \cdot AFR & BPR = 0 \\
//!       0.7769 \cdot AFR \cdot (1 + BPR) + 0.887 & BPR > 0 \end{cases} $$
//! 3. $EI_{nvol} = CI \cdot Q / 1000$
//! 4. $EI_{FSC} = 1000 \cdot (FSC \cdot \epsilon \cdot MW_{SO_4}) / MW_S$, a constant
//! 5. $EI_{vol} = \delta_{mode} \cdot EI_{HC} / 1000$ using CFM56 organic/HC ratios
//!
//! All indices are in grams per kg of fuel.
//!
//! The two branches of the concentration index do not meet exactly at $SN = 30$: the
//! power law gives about 4.62 and the quadratic about 4.58, a step of roughly 0.9 %.
//! The correlation is used as published.

use alaqs_core::errors::AlaqsResult;
use alaqs_core::flight_mode::FlightMode;
use serde::{Deserialize, Serialize};

/// Smoke number at which the concentration index switches to the quadratic fit
pub const SMOKE_NUMBER_BREAKPOINT: f64 = 30.0;

/// Fuel sulphur content (mass fraction)
const FUEL_SULPHUR_CONTENT: f64 = 0.00068;
/// Conversion efficiency of fuel sulphur (S(IV)) to sulphate (S(VI))
const SULPHATE_CONVERSION: f64 = 0.024;
/// Molecular weight of sulphate
/// unit: g / mol
const MW_SULPHATE: f64 = 96.0;
/// Molecular weight of sulphur
/// unit: g / mol
const MW_SULPHUR: f64 = 32.0;

/// Fuel-sulphur PM emission index, independent of engine and mode
/// unit: g / kg
pub const EI_FUEL_SULPHUR: f64 =
    1000.0 * (FUEL_SULPHUR_CONTENT * SULPHATE_CONVERSION * MW_SULPHATE) / MW_SULPHUR;

/// Air-fuel ratio of each mode
fn air_fuel_ratio(mode: FlightMode) -> f64 {
    match mode {
        FlightMode::Taxi => 106.0,
        FlightMode::Approach => 83.0,
        FlightMode::ClimbOut => 51.0,
        FlightMode::TakeOff => 45.0,
    }
}

/// Ratio of volatile organic PM (mg/kg) to HC (g/kg) measured on the CFM56-2-C1
fn organic_to_hc_ratio(mode: FlightMode) -> f64 {
    match mode {
        FlightMode::Taxi => 6.17,
        FlightMode::Approach => 56.25,
        FlightMode::ClimbOut => 76.0,
        FlightMode::TakeOff => 115.0,
    }
}

/// Concentration index from a smoke number
/// unit: mg / m^3
pub fn concentration_index(smoke_number: f64) -> f64 {
    if smoke_number <= SMOKE_NUMBER_BREAKPOINT {
        0.06949 * smoke_number.powf(1.234)
    } else {
        0.0297 * smoke_number.powi(2) - 1.803 * smoke_number + 31.94
    }
}

/// Exhaust volumetric flow per kg of fuel
/// unit: m^3 / kg
pub fn exhaust_volumetric_flow(mode: FlightMode, bypass_ratio: f64) -> f64 {
    let afr = air_fuel_ratio(mode);
    if bypass_ratio == 0.0 {
        0.776 * afr
    } else {
        0.7769 * afr * (1.0 + bypass_ratio) + 0.887
    }
}

/// PM emission indices of one engine at one mode
/// unit: g / kg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticulateMatterIndices {
    pub non_volatile: f64,
    pub fuel_sulphur: f64,
    pub volatile: f64,
    pub total: f64,
}

impl ParticulateMatterIndices {
    pub fn for_mode(mode: FlightMode, smoke_number: f64, ei_hc: f64, bypass_ratio: f64) -> Self {
        let ci = concentration_index(smoke_number);
        let q = exhaust_volumetric_flow(mode, bypass_ratio);

        let non_volatile = ci * q / 1000.0;
        let fuel_sulphur = EI_FUEL_SULPHUR;
        let volatile = organic_to_hc_ratio(mode) * ei_hc / 1000.0;

        Self {
            non_volatile,
            fuel_sulphur,
            volatile,
            total: non_volatile + fuel_sulphur + volatile,
        }
    }

    /// `[non_volatile, fuel_sulphur, volatile, total]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.non_volatile, self.fuel_sulphur, self.volatile, self.total]
    }
}

/// PM emission indices for a mode given by its code (`TX`, `AP`, `CO` or `TO`).
///
/// Fails with [`alaqs_core::errors::AlaqsError::InvalidMode`] for any other code.
pub fn compute_particulate_matter(
    mode: &str,
    smoke_number: f64,
    ei_hc: f64,
    bypass_ratio: f64,
) -> AlaqsResult<ParticulateMatterIndices> {
    let mode: FlightMode = mode.parse()?;
    Ok(ParticulateMatterIndices::for_mode(
        mode,
        smoke_number,
        ei_hc,
        bypass_ratio,
    ))
}
