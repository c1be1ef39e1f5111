//! Implementations for the ConvCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{Matrix2, Vector2};
use serde::Serialize;

// Internal
use super::{ConvCtrlError, ConvergenceLaw, Params, PropLaw};
use crate::loc::Pose;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Convergence control module state
pub struct ConvCtrl {
    params: Params,

    law: Box<dyn ConvergenceLaw>,

    report: StatusReport,
}

/// Input data to Convergence Control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Current pose of the robot, frame centred
    pub pose: Pose,

    /// Goal position of the control point, frame centred.
    ///
    /// Units: pixels
    pub goal_px: [f64; 2]
}

/// Speed demands output by ConvCtrl.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct OutputData {
    /// Linear speed demand (V)
    ///
    /// Units: pixels/second
    pub speed_pxs: f64,

    /// Angular rate demand (W)
    ///
    /// Units: radians/second
    pub turn_rate_rads: f64
}

/// Status report for ConvCtrl processing.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct StatusReport {
    /// Position of the control point
    pub point_px: [f64; 2],

    /// Goal minus control point position
    pub error_px: [f64; 2],

    /// Desired control point velocity given by the convergence law
    pub point_vel_pxs: [f64; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConvCtrl {
    /// Create a new convergence controller using the proportional law.
    ///
    /// An error is returned if the offset is zero, as the control point would coincide with the
    /// robot centre and the decoupling matrix would be singular.
    pub fn new(params: Params) -> Result<Self, ConvCtrlError> {
        if !params.gain.is_finite() {
            return Err(ConvCtrlError::InvalidGain(params.gain));
        }

        let law = PropLaw { gain: params.gain };
        
        Self::with_law(params, Box::new(law))
    }

    /// Create a new convergence controller with a custom convergence law.
    ///
    /// The `gain` parameter is not used by this controller, only by the law.
    pub fn with_law(params: Params, law: Box<dyn ConvergenceLaw>) -> Result<Self, ConvCtrlError> {
        if params.offset_px == 0.0 || !params.offset_px.is_finite() {
            return Err(ConvCtrlError::InvalidOffset(params.offset_px));
        }

        Ok(Self {
            params,
            law,
            report: StatusReport::default()
        })
    }

    /// Get the parameters of this controller.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl State for ConvCtrl {
    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ConvCtrlError;

    /// Calculate the speed demands driving the control point towards the goal.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let pose = &input_data.pose;
        let l = self.params.offset_px;

        let point = control_point(pose, l);
        let goal = Vector2::new(input_data.goal_px[0], input_data.goal_px[1]);
        let point_vel = self.law.point_vel(&point, &goal);

        self.report.point_px = [point[0], point[1]];
        self.report.error_px = [goal[0] - point[0], goal[1] - point[1]];
        self.report.point_vel_pxs = [point_vel[0], point_vel[1]];

        let output = solve_speed_dems(pose.theta, l, &point_vel)?;

        trace!(
            "ConvCtrl: point = {:?}, error = {:?}, u = {:?}, V = {:.3}, W = {:.3}",
            self.report.point_px,
            self.report.error_px,
            self.report.point_vel_pxs,
            output.speed_pxs,
            output.turn_rate_rads
        );

        Ok((output, self.report))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Position of the control point, offset `l` ahead of the robot centre along its heading.
pub fn control_point(pose: &Pose, l: f64) -> Vector2<f64> {
    Vector2::new(
        pose.x + l * pose.theta.cos(),
        pose.y + l * pose.theta.sin()
    )
}

/// The decoupling matrix relating `(V, W)` to the control point velocity.
pub fn decoupling_matrix(theta: f64, l: f64) -> Matrix2<f64> {
    let (sin, cos) = theta.sin_cos();

    Matrix2::new(
        cos, -l * sin,
        sin,  l * cos
    )
}

/// Solve the decoupling system for the speed demands giving the desired control point velocity.
pub fn solve_speed_dems(
    theta: f64, 
    l: f64, 
    point_vel: &Vector2<f64>
) -> Result<OutputData, ConvCtrlError> {
    let dems = decoupling_matrix(theta, l)
        .lu()
        .solve(point_vel)
        .ok_or(ConvCtrlError::SingularDecoupling(theta))?;

    Ok(OutputData {
        speed_pxs: dems[0],
        turn_rate_rads: dems[1]
    })
}
