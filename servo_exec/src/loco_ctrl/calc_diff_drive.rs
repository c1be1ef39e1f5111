//! Differential drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::WheelDems;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the unlimited wheel rates for the given speed demands.
///
/// # Arguments
/// - `speed`: linear speed V
/// - `turn_rate`: angular rate W
/// - `wheel_radius`: r
/// - `axle_length`: L
pub fn calc_diff_drive(speed: f64, turn_rate: f64, wheel_radius: f64, axle_length: f64) -> WheelDems {
    let lin = speed / wheel_radius;
    let ang = (axle_length * turn_rate) / (2.0 * wheel_radius);

    WheelDems {
        right_rads: lin + ang,
        left_rads: lin - ang
    }
}

/// Limit a wheel rate to [-max, max].
///
/// Returns the limited rate and whether a limit was applied.
pub fn limit_wheel_rate(rate: f64, max: f64) -> (f64, bool) {
    let limited = rate.clamp(-max, max);

    (limited, limited != rate)
}
