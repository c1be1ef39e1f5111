//! Goal publisher
//!
//! Publishes a fixed goal on the goal topic at a regular rate, standing in for the planner when
//! testing the servoing executable.

use comms_if::{
    eqpt::goal::GoalMsg,
    net::{MonitoredSocket, SocketOptions}
};
use chrono::Utc;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "goal_pub", about = "Publish goals for the servoing executable")]
struct Opt {
    /// Goal x offset from the frame centre in pixels
    #[structopt(allow_hyphen_values = true)]
    x: f64,

    /// Goal y offset from the frame centre in pixels
    #[structopt(allow_hyphen_values = true)]
    y: f64,

    /// Endpoint to bind the publisher to
    #[structopt(short, long, default_value = "tcp://*:1883")]
    endpoint: String,

    /// Topic to publish goals on
    #[structopt(short, long, default_value = "huber/robot/goal")]
    topic: String,

    /// Publishing period in milliseconds
    #[structopt(short, long, default_value = "100")]
    period_ms: u64,

    /// Number of goals to publish, publishes forever if not given
    #[structopt(short, long)]
    count: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {

    let opt = Opt::from_args();

    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        linger: 0,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(
        &ctx,
        zmq::PUB,
        socket_options,
        &opt.endpoint
    )?;

    println!("Publishing goal ({}, {}) on {} at {}", opt.x, opt.y, opt.topic, opt.endpoint);

    let mut seq: u64 = 0;

    while opt.count.map(|c| seq < c).unwrap_or(true) {
        let msg = GoalMsg {
            x: opt.x,
            y: opt.y,
            seq: Some(seq as i64),
            t_ms: Some(Utc::now().timestamp_millis())
        };

        // First frame is the topic, subscribers filter on it
        let payload = msg.to_payload()?;
        match socket.send_multipart(vec![opt.topic.as_bytes(), &payload[..]], 0) {
            Ok(_) => (),
            Err(e) => println!("Failed to send goal: {}", e)
        }

        seq += 1;

        std::thread::sleep(std::time::Duration::from_millis(opt.period_ms));
    }

    Ok(())
}
