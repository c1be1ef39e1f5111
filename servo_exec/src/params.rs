//! # Servo Executable Parameters
//!
//! This module provides parameters for the servo executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

use crate::cycle_mgr::CycleMgrParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServoExecParams {

    /// Width of the camera frame, goals and poses are relative to the frame centre
    ///
    /// Units: pixels
    pub frame_width_px: u32,

    /// Height of the camera frame
    ///
    /// Units: pixels
    pub frame_height_px: u32,

    /// Marker id of the controlled robot
    pub robot_id: u32,

    /// Goal used before any goal is received
    ///
    /// Units: pixels, frame centred
    #[serde(default)]
    pub default_goal_px: [i64; 2],

    /// If set, goals older than this are replaced by the default goal. If not set the robot
    /// keeps driving to the last goal received however old it is.
    ///
    /// Units: seconds
    #[serde(default)]
    pub goal_timeout_s: Option<f64>,

    /// Command the robot to stop when its marker is lost, rather than keep the last demands.
    #[serde(default)]
    pub stop_on_marker_loss: bool,

    /// Maximum time to wait for a frame of detections
    ///
    /// Units: milliseconds
    pub frame_timeout_ms: i32,

    /// Maximum time to wait for the mechanisms server on each request
    ///
    /// Units: milliseconds
    pub mech_timeout_ms: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoExecParams {
    /// Parameters for the cycle manager.
    pub fn cycle_mgr_params(&self) -> CycleMgrParams {
        CycleMgrParams {
            default_goal_px: self.default_goal_px,
            goal_timeout_s: self.goal_timeout_s,
            stop_on_marker_loss: self.stop_on_marker_loss
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let p: ServoExecParams = util::params::from_str(
            include_str!("../../params/servo_exec.toml")
        ).unwrap();

        assert_eq!(p.frame_width_px, 1280);
        assert_eq!(p.frame_height_px, 720);
        assert_eq!(p.robot_id, 1);
        assert_eq!(p.default_goal_px, [0, 0]);
        assert_eq!(p.goal_timeout_s, None);
        assert!(!p.stop_on_marker_loss);

        let c = p.cycle_mgr_params();
        assert_eq!(c.goal_timeout_s, None);
    }

    #[test]
    fn test_optional_fields() {
        let p: ServoExecParams = util::params::from_str(r#"
            frame_width_px = 640
            frame_height_px = 480
            robot_id = 3
            default_goal_px = [10, -20]
            goal_timeout_s = 2.5
            stop_on_marker_loss = true
            frame_timeout_ms = 200
            mech_timeout_ms = 500
        "#).unwrap();

        let c = p.cycle_mgr_params();
        assert_eq!(c.default_goal_px, [10, -20]);
        assert_eq!(c.goal_timeout_s, Some(2.5));
        assert!(c.stop_on_marker_loss);
    }
}
