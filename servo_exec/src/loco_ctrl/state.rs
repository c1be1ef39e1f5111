//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{calc_diff_drive, limit_wheel_rate, LocoCtrlError, Params};
use crate::conv_ctrl;
use comms_if::eqpt::mech::WheelDems;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state
#[derive(Debug)]
pub struct LocoCtrl {
    params: Params,

    report: StatusReport,
}

/// Input data to Locomotion Control, the speed demands from ConvCtrl.
pub type InputData = conv_ctrl::OutputData;

/// Output wheel demands.
pub type OutputData = WheelDems;

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Wheel demands before limiting
    pub unlimited: WheelDems,

    /// Right wheel demand was limited
    pub right_limited: bool,

    /// Left wheel demand was limited
    pub left_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Create a new instance of LocoCtrl, checking the parameters describe a real robot.
    pub fn new(params: Params) -> Result<Self, LocoCtrlError> {
        let checks = [
            ("wheel_radius_px", params.wheel_radius_px),
            ("axle_length_px", params.axle_length_px),
            ("max_wheel_rate", params.max_wheel_rate),
        ];

        for (name, value) in checks.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(LocoCtrlError::InvalidParam(*name, *value));
            }
        }

        Ok(Self {
            params,
            report: StatusReport::default()
        })
    }

    /// Get the parameters of this module.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl State for LocoCtrl {
    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LocoCtrlError;

    /// Calculate the limited wheel demands for the given speed demands.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let unlimited = calc_diff_drive(
            input_data.speed_pxs,
            input_data.turn_rate_rads,
            self.params.wheel_radius_px,
            self.params.axle_length_px
        );

        let (right_rads, right_limited) = limit_wheel_rate(
            unlimited.right_rads, self.params.max_wheel_rate
        );
        let (left_rads, left_limited) = limit_wheel_rate(
            unlimited.left_rads, self.params.max_wheel_rate
        );

        self.report = StatusReport {
            unlimited,
            right_limited,
            left_limited
        };

        let output = WheelDems { right_rads, left_rads };

        trace!(
            "LocoCtrl output: right = {:.3}, left = {:.3} (limited: {}, {})",
            output.right_rads,
            output.left_rads,
            right_limited,
            left_limited
        );

        Ok((output, self.report))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn loco_ctrl() -> LocoCtrl {
        LocoCtrl::new(Params {
            wheel_radius_px: 58.0,
            axle_length_px: 120.0,
            max_wheel_rate: 150.0
        }).unwrap()
    }

    #[test]
    fn test_invalid_params() {
        let bad = [
            (0.0, 120.0, 150.0),
            (58.0, -1.0, 150.0),
            (58.0, 120.0, 0.0),
            (f64::NAN, 120.0, 150.0),
        ];

        for (r, l, w) in bad.iter() {
            assert!(LocoCtrl::new(Params {
                wheel_radius_px: *r,
                axle_length_px: *l,
                max_wheel_rate: *w
            }).is_err());
        }
    }

    #[test]
    fn test_single_wheel_limited() {
        let mut lc = loco_ctrl();

        // V/r = 95 and LW/2r = 105 give unlimited rates of 200 and -10
        let (out, rpt) = lc.proc(&InputData {
            speed_pxs: 5510.0,
            turn_rate_rads: 101.5
        }).unwrap();

        assert!((rpt.unlimited.right_rads - 200.0).abs() < 1e-9);
        assert!((rpt.unlimited.left_rads + 10.0).abs() < 1e-9);

        assert_eq!(out.right_rads, 150.0);
        assert!((out.left_rads + 10.0).abs() < 1e-9);
        assert!(rpt.right_limited);
        assert!(!rpt.left_limited);
    }

    #[test]
    fn test_outputs_always_bounded() {
        let mut lc = loco_ctrl();

        for v in &[-1e6, -9750.0, -1.0, 0.0, 3.0, 9750.0, 1e6] {
            for w in &[-1e4, -2.5, 0.0, 0.1, 390.0, 1e4] {
                let input = InputData { speed_pxs: *v, turn_rate_rads: *w };
                let (out, rpt) = lc.proc(&input).unwrap();

                // Unlimited values follow the differential drive relations
                let lin = v / 58.0;
                let ang = 120.0 * w / (2.0 * 58.0);
                assert!((rpt.unlimited.right_rads - (lin + ang)).abs() < 1e-6);
                assert!((rpt.unlimited.left_rads - (lin - ang)).abs() < 1e-6);

                assert!(out.right_rads.abs() <= 150.0);
                assert!(out.left_rads.abs() <= 150.0);

                if *w == 0.0 {
                    assert_eq!(out.right_rads, out.left_rads);
                }
            }
        }
    }
}
