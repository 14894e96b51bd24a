//! Twin-quadratic fuel flow interpolation.
//!
//! The ICAO Engine Emissions Databank (EEDB) certifies fuel flow at four thrust settings:
//! 7 % (taxi), 30 % (approach), 85 % (climb-out) and 100 % (take-off). Fuel flow at an
//! intermediate power setting $x$ is taken from one of two quadratics, each passing
//! exactly through three of the certified points:
//!
//! * $0.07 \le x \le 0.85$: through the 7 %, 30 % and 85 % points
//! * $0.85 < x \le 1.00$: through the 30 %, 85 % and 100 % points
//!
//! The points are normalised by the take-off fuel flow before fitting and the result is
//! rescaled afterwards. The interpolated fuel flow is clamped to be non-negative.

use alaqs_core::errors::{AlaqsError, AlaqsResult};
use alaqs_core::flight_mode::FlightMode;
use std::collections::BTreeMap;

/// Lowest certified thrust setting
pub const MIN_POWER_SETTING: f64 = 0.07;
/// Highest certified thrust setting
pub const MAX_POWER_SETTING: f64 = 1.0;

/// Power setting separating the lower and upper quadratic
const BASIS_SPLIT: f64 = 0.85;

fn certified_point(eedb: &BTreeMap<FlightMode, f64>, mode: FlightMode) -> AlaqsResult<(f64, f64)> {
    let value = eedb.get(&mode).copied().ok_or_else(|| {
        AlaqsError::MissingData(format!(
            "EEDB fuel flow at {} thrust ({mode})",
            mode.thrust_setting()
        ))
    })?;
    if !value.is_finite() {
        return Err(AlaqsError::MissingData(format!(
            "EEDB fuel flow at {mode} is not finite"
        )));
    }
    Ok((mode.thrust_setting(), value))
}

/// Exact quadratic through three points, evaluated at `x`
fn lagrange(points: [(f64, f64); 3], x: f64) -> f64 {
    let [(x0, y0), (x1, y1), (x2, y2)] = points;
    y0 * (x - x1) * (x - x2) / ((x0 - x1) * (x0 - x2))
        + y1 * (x - x0) * (x - x2) / ((x1 - x0) * (x1 - x2))
        + y2 * (x - x0) * (x - x1) / ((x2 - x0) * (x2 - x1))
}

/// Fuel flow of one engine at `power_setting` (fraction of rated thrust)
///
/// `eedb` holds the certified fuel flow (kg/s) for each of the four LTO modes.
///
/// # Errors
///
/// * [`AlaqsError::MissingData`] if any of the four modes is absent from `eedb`
/// * [`AlaqsError::InvalidInput`] if `power_setting` is outside `[0.07, 1.00]`
///
/// unit: kg / s
pub fn fuel_flow(power_setting: f64, eedb: &BTreeMap<FlightMode, f64>) -> AlaqsResult<f64> {
    let taxi = certified_point(eedb, FlightMode::Taxi)?;
    let approach = certified_point(eedb, FlightMode::Approach)?;
    let climb_out = certified_point(eedb, FlightMode::ClimbOut)?;
    let take_off = certified_point(eedb, FlightMode::TakeOff)?;

    if !(MIN_POWER_SETTING..=MAX_POWER_SETTING).contains(&power_setting) {
        return Err(AlaqsError::InvalidInput(format!(
            "power setting {power_setting} outside [{MIN_POWER_SETTING}, {MAX_POWER_SETTING}]"
        )));
    }

    let max_flow = take_off.1;
    if max_flow <= 0.0 {
        return Err(AlaqsError::InvalidInput(format!(
            "take-off fuel flow must be positive, got {max_flow}"
        )));
    }
    let normalise = |(x, y): (f64, f64)| (x, y / max_flow);

    let basis = if power_setting <= BASIS_SPLIT {
        [taxi, approach, climb_out]
    } else {
        [approach, climb_out, take_off]
    };

    let relative = lagrange(basis.map(normalise), power_setting);
    Ok((relative * max_flow).max(0.0))
}
