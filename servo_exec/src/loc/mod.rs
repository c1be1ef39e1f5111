//! # Localisation module
//!
//! This module provides the robot pose from an overhead camera tracking fiducial markers. The
//! detection of markers and the association of markers to robots happen behind two traits:
//!
//! - [`MarkerDetector`] produces the markers seen in one camera frame.
//! - [`PoseTracker`] updates a [`PoseTable`] of robot poses from those detections.
//!
//! [`LocMgr`] composes the two, keeps the pose table between cycles and provides the pose of the
//! controlled robot through the [`PoseSource`] trait used by the cycle manager.
//!
//! Poses given to the controller are in pixels relative to the centre of the camera frame, the
//! same frame goals are given in.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod tracker;
pub use tracker::MarkerTracker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use log::trace;
use serde::Serialize;

pub use comms_if::eqpt::perloc::MarkerCorners;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose of a robot in the camera frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
pub struct Pose {
    /// X position.
    ///
    /// Units: pixels
    pub x: f64,

    /// Y position.
    ///
    /// Units: pixels
    pub y: f64,

    /// Heading, angle from the positive X axis.
    ///
    /// Units: radians
    pub theta: f64
}

/// Markers detected in a single camera frame.
///
/// `corners` and `ids` are parallel, the marker with id `ids[i]` has corners `corners[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detections<F> {
    /// Handle to the frame the detections were made in
    pub frame: F,

    /// Corners of each detected marker in image pixels
    pub corners: Vec<MarkerCorners>,

    /// Identifier of each detected marker
    pub ids: Vec<u32>
}

/// Latest known pose of each robot, indexed by marker id. Poses are in image pixels.
pub type PoseTable = HashMap<u32, Pose>;

/// Combines a detector and tracker to locate one robot.
pub struct LocMgr<D, T> {
    detector: D,
    tracker: T,
    table: PoseTable,

    /// Marker id of the controlled robot
    robot_id: u32,

    /// Position of the frame centre in image pixels
    frame_centre_px: [f64; 2]
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LocError {
    #[error("Frame resolution must be positive, found {0}x{1}")]
    InvalidResolution(u32, u32),

    #[error("Could not get detections from the marker detector: {0}")]
    DetectorError(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Produces the fiducial markers visible in the latest camera frame.
pub trait MarkerDetector {
    /// Handle to the frame detections were made in.
    type Frame;

    /// Get the markers in the next frame.
    ///
    /// This may block until a frame is available.
    fn detect(&mut self) -> Result<Detections<Self::Frame>, LocError>;

    /// Release the camera or connection behind the detector.
    fn release(&mut self) {}
}

/// Associates detected markers with robots.
pub trait PoseTracker {
    /// Update the table with the poses of all robots found in the detections.
    ///
    /// Robots not present in the detections keep their previous entries.
    fn update<F>(&mut self, detections: &Detections<F>, table: &mut PoseTable);
}

/// Provides the pose of the controlled robot to the control cycle.
pub trait PoseSource {
    /// Get the current pose of the robot, or `None` if the robot could not be seen this cycle.
    fn get_pose(&mut self) -> Result<Option<Pose>, LocError>;

    /// Release any resources held by the source.
    fn release(&mut self) {}
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D, T> LocMgr<D, T>
where
    D: MarkerDetector,
    T: PoseTracker
{
    /// Create a new localisation manager tracking `robot_id` in frames of the given resolution.
    pub fn new(
        detector: D, 
        tracker: T, 
        robot_id: u32, 
        frame_width_px: u32, 
        frame_height_px: u32
    ) -> Result<Self, LocError> {
        if frame_width_px == 0 || frame_height_px == 0 {
            return Err(LocError::InvalidResolution(frame_width_px, frame_height_px));
        }

        Ok(Self {
            detector,
            tracker,
            table: PoseTable::new(),
            robot_id,
            frame_centre_px: [frame_width_px as f64 / 2.0, frame_height_px as f64 / 2.0]
        })
    }

    /// The table of all robot poses seen so far, in image pixels.
    pub fn pose_table(&self) -> &PoseTable {
        &self.table
    }

    /// Convert a pose in image pixels into one relative to the frame centre.
    fn centred(&self, pose: &Pose) -> Pose {
        Pose {
            x: pose.x - self.frame_centre_px[0],
            y: pose.y - self.frame_centre_px[1],
            theta: pose.theta
        }
    }
}

impl<D, T> PoseSource for LocMgr<D, T>
where
    D: MarkerDetector,
    T: PoseTracker
{
    fn get_pose(&mut self) -> Result<Option<Pose>, LocError> {
        let detections = self.detector.detect()?;

        if detections.ids.is_empty() {
            return Ok(None);
        }

        // Only give a pose if the robot was actually measured in this frame, an old table entry
        // is not a measurement. The tracker may still skip the robot's marker, so its entry is
        // cleared first.
        let seen = detections.ids.contains(&self.robot_id);
        if seen {
            self.table.remove(&self.robot_id);
        }

        self.tracker.update(&detections, &mut self.table);

        if !seen {
            trace!("Robot {} not in frame, saw {:?}", self.robot_id, detections.ids);
            return Ok(None);
        }

        let pose = self.table.get(&self.robot_id).map(|p| self.centred(p));
        if pose.is_none() {
            trace!("Robot {} detected but its marker could not be tracked", self.robot_id);
        }

        Ok(pose)
    }

    fn release(&mut self) {
        self.detector.release();
    }
}
