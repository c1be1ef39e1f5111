//! Parameters structure for ConvCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for convergence control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Gain applied to the control point position error to give the desired control point
    /// velocity.
    ///
    /// Units: 1/seconds
    pub gain: f64,

    /// Distance from the centre of the robot to the control point, along the heading. Must not
    /// be zero.
    ///
    /// Units: pixels
    pub offset_px: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let p: Params = util::params::from_str(
            include_str!("../../../params/conv_ctrl.toml")
        ).unwrap();

        assert_eq!(p.gain, 130.0);
        assert_eq!(p.offset_px, 25.0);
    }
}
