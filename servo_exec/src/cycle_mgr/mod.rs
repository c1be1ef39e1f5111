//! # Cycle Manager
//!
//! The cycle manager runs the control loop of the executable. Each cycle:
//!
//! 1. Takes a snapshot of the goal.
//! 2. Gets the pose of the robot from the [`PoseSource`], which blocks until the next camera
//!    frame is available.
//! 3. If the robot was not seen the cycle is idle, nothing is computed or sent and the robot
//!    keeps its last demands.
//! 4. Otherwise ConvCtrl and LocoCtrl are processed and the resulting wheel demands sent to the
//!    [`ActuationSink`].
//!
//! The loop runs until the stop flag is raised, at which point the robot is stopped before any
//! resources are released.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fmt::{Debug, Display},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use log::{debug, error, info, trace, warn};
use serde::Serialize;

use comms_if::eqpt::mech::WheelDems;
use util::module::State;

use crate::{
    conv_ctrl::{self, ConvCtrl},
    goal::{Goal, GoalState},
    loc::PoseSource,
    loco_ctrl::LocoCtrl,
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can drive the robot's wheels.
///
/// Both calls may block.
pub trait ActuationSink {
    type Error: Display + Debug;

    /// Send wheel demands to the robot.
    fn send(&mut self, dems: &WheelDems) -> Result<(), Self::Error>;

    /// Release the link to the robot. No demands can be sent afterwards.
    fn disconnect(&mut self) -> Result<(), Self::Error>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the cycle manager.
#[derive(Debug, Clone, Default)]
pub struct CycleMgrParams {
    /// Goal used when the received goal has timed out.
    pub default_goal_px: [i64; 2],

    /// Age after which a goal is considered stale, `None` to never time out.
    pub goal_timeout_s: Option<f64>,

    /// Stop the robot when it is lost rather than keeping the last demands.
    pub stop_on_marker_loss: bool,
}

/// Counters describing the cycles run so far.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CycleStats {
    /// Total number of cycles run
    pub num_cycles: u64,

    /// Number of cycles in which demands were computed
    pub num_tracking: u64,

    /// Number of cycles in which the robot was not seen
    pub num_idle: u64,

    /// Number of errors from the pose source
    pub num_pose_errors: u64,

    /// Number of errors from control processing
    pub num_ctrl_errors: u64,

    /// Number of demands that the sink failed to send
    pub num_dispatch_errors: u64,
}

/// The control loop.
pub struct CycleMgr<P, A> {
    params: CycleMgrParams,

    goal_state: GoalState,

    conv_ctrl: ConvCtrl,

    loco_ctrl: LocoCtrl,

    pose_source: P,

    sink: A,

    mode: Mode,

    stats: CycleStats,

    /// Last demands successfully sent
    last_dems: Option<WheelDems>,

    /// Age after which a goal is stale
    goal_timeout: Option<Duration>,

    /// True while the goal is timed out
    goal_timed_out: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CycleMgrError {
    #[error("The goal timeout must be a positive number of seconds that fits a duration, found {0}")]
    InvalidGoalTimeout(f64),
}

/// Mode of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// The robot was seen in the last cycle and demands were computed.
    Tracking,

    /// The robot was not seen in the last cycle.
    Idle,

    /// The loop has stopped and all resources are released.
    Shutdown,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CycleMgrParams {
    /// The goal timeout as a duration, checking it is positive and finite.
    pub fn goal_timeout(&self) -> Result<Option<Duration>, CycleMgrError> {
        match self.goal_timeout_s {
            Some(t) if t > 0.0 && t.is_finite() => Duration::try_from_secs_f64(t)
                .map(Some)
                .map_err(|_| CycleMgrError::InvalidGoalTimeout(t)),
            Some(t) => Err(CycleMgrError::InvalidGoalTimeout(t)),
            None => Ok(None)
        }
    }
}

impl<P, A> CycleMgr<P, A>
where
    P: PoseSource,
    A: ActuationSink
{
    /// Create a new cycle manager, starting in `Idle`.
    ///
    /// An invalid goal timeout is rejected here rather than when the loop is running.
    pub fn new(
        params: CycleMgrParams,
        goal_state: GoalState,
        conv_ctrl: ConvCtrl,
        loco_ctrl: LocoCtrl,
        pose_source: P,
        sink: A
    ) -> Result<Self, CycleMgrError> {
        let goal_timeout = params.goal_timeout()?;

        Ok(Self {
            params,
            goal_state,
            conv_ctrl,
            loco_ctrl,
            pose_source,
            sink,
            mode: Mode::Idle,
            stats: CycleStats::default(),
            last_dems: None,
            goal_timeout,
            goal_timed_out: false
        })
    }

    /// Current mode of the loop.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// The last demands which were successfully sent to the robot.
    pub fn last_dems(&self) -> Option<WheelDems> {
        self.last_dems
    }

    /// Run cycles until `stop` is raised, then shut down.
    pub fn run(&mut self, stop: &AtomicBool) {
        info!("Begining control loop");

        while !stop.load(Ordering::SeqCst) {
            self.step();
        }

        info!("Stop requested after {} cycles", self.stats.num_cycles);

        self.shutdown();
    }

    /// Run a single cycle, returning the mode at the end of the cycle.
    pub fn step(&mut self) -> Mode {
        if self.mode == Mode::Shutdown {
            return self.mode;
        }

        self.stats.num_cycles += 1;

        // ---- GOAL ----

        // Snapshot first, any goal arriving after this is used next cycle
        let goal = self.goal_state.snapshot();
        let goal_px = self.effective_goal(&goal);

        // ---- POSE ----

        let pose = match self.pose_source.get_pose() {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not get the robot pose: {}", e);
                self.stats.num_pose_errors += 1;
                None
            }
        };

        let pose = match pose {
            Some(p) => p,
            None => {
                self.enter_idle();
                return self.mode;
            }
        };

        if self.mode != Mode::Tracking {
            info!("Robot found, tracking");
            self.mode = Mode::Tracking;
        }
        self.stats.num_tracking += 1;

        // ---- CONTROL ----

        let conv_input = conv_ctrl::InputData { pose, goal_px };

        let dems = match self.conv_ctrl.proc(&conv_input) {
            Ok((speed_dems, _)) => match self.loco_ctrl.proc(&speed_dems) {
                Ok((d, _)) => d,
                Err(e) => {
                    warn!("Error during LocoCtrl processing: {}", e);
                    self.stats.num_ctrl_errors += 1;
                    return self.mode;
                }
            },
            Err(e) => {
                warn!("Error during ConvCtrl processing: {}", e);
                self.stats.num_ctrl_errors += 1;
                return self.mode;
            }
        };

        trace!(
            "Cycle {}: pose = {:?}, goal = {:?}, dems = {:?}",
            self.stats.num_cycles,
            pose,
            goal_px,
            dems
        );

        // ---- DISPATCH ----

        self.dispatch(&dems);

        self.mode
    }

    /// Stop the robot and release all resources.
    ///
    /// The zero demand is always sent before the link or pose source are released. Calling this
    /// more than once has no further effect.
    pub fn shutdown(&mut self) {
        if self.mode == Mode::Shutdown {
            return;
        }

        info!("Shutting down control loop");

        match self.sink.send(&WheelDems::stop()) {
            Ok(()) => {
                self.last_dems = Some(WheelDems::stop());
                info!("Robot stopped");
            },
            Err(e) => error!("Could not stop the robot: {}", e)
        }

        if let Err(e) = self.sink.disconnect() {
            warn!("Error disconnecting from the robot: {}", e);
        }

        self.pose_source.release();

        self.mode = Mode::Shutdown;

        info!(
            "Control loop shut down: {} cycles, {} tracking, {} idle",
            self.stats.num_cycles,
            self.stats.num_tracking,
            self.stats.num_idle
        );
    }

    /// Get the goal to use this cycle, the default goal if the received one is stale.
    fn effective_goal(&mut self, goal: &Goal) -> [f64; 2] {
        let timed_out = match self.goal_timeout {
            Some(t) => goal.age() > t,
            None => false
        };

        if timed_out != self.goal_timed_out {
            if timed_out {
                warn!(
                    "No goal received for {:.1} s, using the default goal {:?}",
                    goal.age().as_secs_f64(),
                    self.params.default_goal_px
                );
            }
            else {
                info!("Fresh goal received, leaving default goal");
            }
            self.goal_timed_out = timed_out;
        }

        if timed_out {
            [
                self.params.default_goal_px[0] as f64,
                self.params.default_goal_px[1] as f64
            ]
        }
        else {
            goal.position()
        }
    }

    /// Move into idle, stopping the robot if configured to do so.
    fn enter_idle(&mut self) {
        self.stats.num_idle += 1;

        if self.mode == Mode::Idle {
            return;
        }

        self.mode = Mode::Idle;

        if self.params.stop_on_marker_loss {
            warn!("Robot lost, stopping");
            self.dispatch(&WheelDems::stop());
        }
        else {
            // Keeps driving on the last demands
            warn!("Robot lost, last demands remain active");
        }
    }

    /// Send demands to the sink, dropping them if the send fails.
    fn dispatch(&mut self, dems: &WheelDems) {
        match self.sink.send(dems) {
            Ok(()) => self.last_dems = Some(*dems),
            Err(e) => {
                self.stats.num_dispatch_errors += 1;
                warn!("Could not send demands to the robot: {}", e);
                debug!("Dropped demands: {:?}", dems);
            }
        }
    }
}
