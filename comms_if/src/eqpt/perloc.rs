//! # Perloc Equipment Communications Module
//!
//! The marker tracker (perception-localisation exec) publishes one [`MarkerFrame`] per camera
//! frame, containing the corners and identifiers of every fiducial marker it found.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// The four corners of a detected marker in image pixel coordinates, in the order reported by
/// the detector (top-left, top-right, bottom-right, bottom-left of the marker).
pub type MarkerCorners = [[f64; 2]; 4];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// All markers detected in a single camera frame.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct MarkerFrame {
    /// Sequence number of the camera frame
    pub frame_seq: u64,

    /// Capture timestamp of the frame in milliseconds since the unix epoch, if known
    #[serde(default)]
    pub timestamp_ms: Option<i64>,

    /// Corners of each detected marker
    pub corners: Vec<MarkerCorners>,

    /// Identifiers of each detected marker, parallel to `corners`
    pub ids: Vec<u32>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_marker_frame_json() {
        let frame: MarkerFrame = serde_json::from_str(
            r#"{
                "frame_seq": 4,
                "corners": [[[0, 0], [10, 0], [10, 10], [0, 10]]],
                "ids": [1]
            }"#
        ).unwrap();

        assert_eq!(frame.frame_seq, 4);
        assert_eq!(frame.timestamp_ms, None);
        assert_eq!(frame.ids, vec![1]);
        assert_eq!(frame.corners[0][2], [10.0, 10.0]);
    }
}
