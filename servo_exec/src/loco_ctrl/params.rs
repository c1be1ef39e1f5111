//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// The radius of the robot's wheels (r).
    ///
    /// Units: pixels.
    pub wheel_radius_px: f64,

    /// Distance between the centres of the two wheels (L).
    ///
    /// Units: pixels.
    pub axle_length_px: f64,

    // ---- CAPABILITIES ----

    /// Maximum absolute wheel rate (wMax). Demands are limited to [-max, max].
    ///
    /// Units: robot wheel rate units
    pub max_wheel_rate: f64,
}
