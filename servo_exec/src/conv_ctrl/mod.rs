//! # Convergence control module
//!
//! Convergence control drives the robot towards the goal position using feedback linearisation
//! of the unicycle model.
//!
//! The centre of a differential drive robot cannot be steered by a static feedback law, since it
//! cannot move sideways. A point offset a distance `l` ahead of the centre along the heading can:
//!
//! ```text
//! x' = x + l cos(theta)
//! y' = y + l sin(theta)
//! ```
//!
//! and its velocity is related to the linear and angular speed of the robot by the decoupling
//! matrix:
//!
//! ```text
//! [x'_dot]   [cos(theta)  -l sin(theta)] [V]
//! [y'_dot] = [sin(theta)   l cos(theta)] [W]
//! ```
//!
//! whose determinant is `l`. A [`ConvergenceLaw`] gives the desired velocity of the offset point
//! from its position error, and solving the system above gives the speed demands `(V, W)`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod law;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use law::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ConvCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ConvCtrlError {
    #[error(
        "The control point offset must be finite and non-zero, found {0}. A zero offset makes \
        the decoupling matrix singular"
    )]
    InvalidOffset(f64),

    #[error("The control gain must be finite, found {0}")]
    InvalidGain(f64),

    #[error("Could not solve the decoupling system at heading {0} rad")]
    SingularDecoupling(f64),
}
