//! # Servo library.
//!
//! This library allows other crates in the workspace, and the benches, to access items defined
//! inside the servo crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Convergence control module - drives a point ahead of the robot towards the goal
pub mod conv_ctrl;

/// Cycle manager - runs the control loop
pub mod cycle_mgr;

/// Goal module - the latest goal commanded to the robot
pub mod goal;

/// Goal client - receives goals published on the goal topic
pub mod goal_client;

/// Localisation module - finds the robot in the camera frame
pub mod loc;

/// Locomotion control module - converts speed demands into individual wheel demands
pub mod loco_ctrl;

/// Mechanisms client - sends wheel demands to the mechanisms server
pub mod mech_client;

/// Parameters for the executable
pub mod params;

/// Perloc client - recieves marker detections from the marker tracker
pub mod perloc_client;
