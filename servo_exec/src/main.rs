//! Main servo executable entry point.
//! 
//! # Architecture
//! 
//! The general execution methodology consists of:
//! 
//!     - Initialise all modules
//!     - Start the goal client, which updates the goal in the background
//!     - Main loop, paced by the camera frame rate:
//!         - Goal snapshot
//!         - Pose acquisition from the marker detections
//!         - Convergence control processing
//!         - Locomotion control processing
//!         - Wheel demands sent to the mechanisms server
//!     - On Ctrl-C stop the robot and release everything
//! 
//! # Modules
//! 
//! All cyclic modules (e.g. `loco_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!     

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering}
};
use color_eyre::{Report, eyre::WrapErr};

// Internal
use comms_if::net::NetParams;
use servo_lib::{
    conv_ctrl::{self, ConvCtrl},
    cycle_mgr::CycleMgr,
    goal::GoalState,
    goal_client::GoalClient,
    loc::{LocMgr, MarkerTracker},
    loco_ctrl::{self, LocoCtrl},
    mech_client::MechClient,
    params::ServoExecParams,
    perloc_client::PerlocClient,
};
use util::{
    host, 
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "servo_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Visual Servoing Executable\n");
    info!(
        "Running on: {:#?}", 
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams = util::params::load(
        "net.toml"
    ).wrap_err("Could not load net params")?;

    let exec_params: ServoExecParams = util::params::load(
        "servo_exec.toml"
    ).wrap_err("Could not load exec params")?;

    let conv_ctrl_params: conv_ctrl::Params = util::params::load(
        "conv_ctrl.toml"
    ).wrap_err("Could not load ConvCtrl params")?;

    let loco_ctrl_params: loco_ctrl::Params = util::params::load(
        "loco_ctrl.toml"
    ).wrap_err("Could not load LocoCtrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let conv_ctrl = ConvCtrl::new(conv_ctrl_params)
        .wrap_err("Failed to initialise ConvCtrl")?;
    info!("ConvCtrl init complete");

    let loco_ctrl = LocoCtrl::new(loco_ctrl_params)
        .wrap_err("Failed to initialise LocoCtrl")?;
    info!("LocoCtrl init complete");

    let goal_state = GoalState::new(
        exec_params.default_goal_px[0], 
        exec_params.default_goal_px[1]
    );

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let goal_client = GoalClient::new(
        &zmq_ctx, 
        &net_params.goal_endpoint, 
        &net_params.goal_topic, 
        goal_state.clone()
    ).wrap_err("Failed to initialise GoalClient")?;
    info!("GoalClient initialised");

    let perloc_client = PerlocClient::new(
        &zmq_ctx, 
        &net_params.perloc_endpoint, 
        exec_params.frame_timeout_ms
    ).wrap_err("Failed to initialise PerlocClient")?;
    info!("PerlocClient initialised");

    let loc_mgr = LocMgr::new(
        perloc_client, 
        MarkerTracker::default(), 
        exec_params.robot_id, 
        exec_params.frame_width_px, 
        exec_params.frame_height_px
    ).wrap_err("Failed to initialise LocMgr")?;

    let mech_client = MechClient::new(
        &zmq_ctx, 
        &net_params.mech_endpoint, 
        exec_params.mech_timeout_ms
    ).wrap_err("Failed to initialise MechClient")?;
    info!("MechClient initialised");

    info!("Network initialisation complete");

    // ---- STOP SIGNAL ----

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl-C recieved, stopping");
            stop.store(true, Ordering::SeqCst);
        }).wrap_err("Failed to set the Ctrl-C handler")?;
    }

    // ---- MAIN LOOP ----

    let mut cycle_mgr = CycleMgr::new(
        exec_params.cycle_mgr_params(), 
        goal_state, 
        conv_ctrl, 
        loco_ctrl, 
        loc_mgr, 
        mech_client
    ).wrap_err("Failed to initialise CycleMgr")?;

    // Runs until the stop flag is raised, then stops the robot and releases the camera and link
    cycle_mgr.run(&stop);

    // ---- SHUTDOWN ----

    info!(
        "GoalClient accepted {} goals and rejected {}", 
        goal_client.num_accepted(), 
        goal_client.num_rejected()
    );
    goal_client.stop();

    info!("End of execution");

    Ok(())
}
