//! Marker based pose tracker

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use util::maths::{centroid, wrap_2pi};

use super::{Detections, MarkerCorners, Pose, PoseTable, PoseTracker};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks robots carrying a single fiducial marker each, with the marker id as the robot id.
///
/// The robot position is the centre of its marker. The heading points from the marker centre
/// towards the middle of the marker's first edge (corner 0 to corner 1), measured in image
/// pixel axes and wrapped to [0, 2pi).
#[derive(Debug, Default, Clone)]
pub struct MarkerTracker;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MarkerTracker {
    /// Calculate the pose of a marker from its corners.
    pub fn marker_pose(corners: &MarkerCorners) -> Option<Pose> {
        let centre = centroid(&corners[..])?;
        let front = centroid(&corners[0..2])?;

        let dx = front[0] - centre[0];
        let dy = front[1] - centre[1];

        // Degenerate marker with all corners on top of each other
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        Some(Pose {
            x: centre[0],
            y: centre[1],
            theta: wrap_2pi(dy.atan2(dx))
        })
    }
}

impl PoseTracker for MarkerTracker {
    fn update<F>(&mut self, detections: &Detections<F>, table: &mut PoseTable) {
        if detections.ids.len() != detections.corners.len() {
            warn!(
                "Mismatched detections: {} ids and {} corner sets",
                detections.ids.len(),
                detections.corners.len()
            );
        }

        for (id, corners) in detections.ids.iter().zip(detections.corners.iter()) {
            match Self::marker_pose(corners) {
                Some(p) => { table.insert(*id, p); },
                None => warn!("Degenerate marker {} ignored", id)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_marker_pose_heading() {
        // First edge along the top of the image (lower y), the marker faces -y
        let up = [[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]];
        let pose = MarkerTracker::marker_pose(&up).unwrap();
        assert!((pose.x - 10.0).abs() < 1e-9);
        assert!((pose.y - 10.0).abs() < 1e-9);
        assert!((pose.theta - 1.5 * PI).abs() < 1e-9);

        // Rotated so the first edge is on the right, the marker faces +x
        let right = [[20.0, 0.0], [20.0, 20.0], [0.0, 20.0], [0.0, 0.0]];
        let pose = MarkerTracker::marker_pose(&right).unwrap();
        assert!(pose.theta.abs() < 1e-9);

        // First edge along the bottom, the marker faces +y
        let down = [[20.0, 20.0], [0.0, 20.0], [0.0, 0.0], [20.0, 0.0]];
        let pose = MarkerTracker::marker_pose(&down).unwrap();
        assert!((pose.theta - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_marker() {
        assert_eq!(MarkerTracker::marker_pose(&[[5.0, 5.0]; 4]), None);
    }

    #[test]
    fn test_update_keeps_unseen_robots() {
        let mut table = PoseTable::new();
        table.insert(7, Pose { x: 1.0, y: 2.0, theta: 0.5 });

        let detections = Detections {
            frame: (),
            corners: vec![[[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]]],
            ids: vec![3]
        };

        MarkerTracker::default().update(&detections, &mut table);

        assert_eq!(table.len(), 2);
        assert_eq!(table[&7], Pose { x: 1.0, y: 2.0, theta: 0.5 });
        assert!((table[&3].x - 10.0).abs() < 1e-9);
    }
}
