//! # Locomotion control module
//!
//! Converts speed demands `(V, W)` into wheel rate demands for a differential drive robot:
//!
//! ```text
//! wd = V/r + (L W)/(2r)
//! wi = V/r - (L W)/(2r)
//! ```
//!
//! where `r` is the wheel radius and `L` the axle length. Each wheel is then limited to the
//! maximum wheel rate independently. Limiting one wheel changes the ratio of linear to angular
//! speed the robot actually achieves, the status report flags when this happens.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_diff_drive;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use calc_diff_drive::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Invalid parameter {0}: expected a finite positive value, found {1}")]
    InvalidParam(&'static str, f64),
}
