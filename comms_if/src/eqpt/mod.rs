//! # Equipment Interface
//!
//! This module defines the interface structures which will be sent to and received from the
//! external equipment the servoing executable talks to.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Goal messages published by the planner
pub mod goal;

/// Wheel demands sent to the mechanisms server
pub mod mech;

/// Marker detections published by the perception-localisation (marker tracking) exec
pub mod perloc;
