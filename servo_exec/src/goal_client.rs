//! # Goal Client
//!
//! The GoalClient subscribes to the goal topic and writes every valid goal it receives into the
//! shared [`GoalState`]. It runs on its own background thread and never blocks, or is blocked
//! by, the control cycle.
//!
//! Delivery is at-most-once and latest-value-wins: goals are applied as soon as they arrive and no
//! backlog is kept. Malformed goals are logged with an excerpt of the payload and dropped without
//! touching the goal state.
//!
//! zmq subscriptions match by prefix, so the client also checks the topic frame of every message
//! and only applies goals published on exactly its topic.
//!
//! Reconnection to the publisher is automatic. The socket retries after 1 s, doubling the
//! interval up to 5 s, and zmq re-sends the subscription on every reconnect.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{Arc, atomic::{AtomicBool, AtomicU64, Ordering}},
    thread::{self, JoinHandle}
};
use chrono::Utc;
use log::{debug, error, info, trace, warn};

use comms_if::{
    eqpt::goal::{payload_excerpt, GoalMsg, GoalParseError},
    net::{MonitoredSocket, MonitoredSocketError, SocketOptions, zmq}
};

use crate::goal::GoalState;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum delay before reconnecting to the publisher.
pub const RECONNECT_MIN_MS: i32 = 1000;

/// Maximum delay before reconnecting to the publisher.
pub const RECONNECT_MAX_MS: i32 = 5000;

/// Receive timeout of the background thread, bounds how long stopping the client takes.
const RECV_TIMEOUT_MS: i32 = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Subscribes to goals and keeps the shared goal state up to date.
pub struct GoalClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    stats: Arc<GoalClientStats>,
}

/// Counters maintained by the background thread.
#[derive(Debug, Default)]
pub struct GoalClientStats {
    /// Number of goals applied to the goal state
    pub num_accepted: AtomicU64,

    /// Number of messages rejected as malformed
    pub num_rejected: AtomicU64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GoalClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to the goal topic: {0}")]
    SubscribeError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GoalClient {
    /// Create a new goal client and start its background thread.
    ///
    /// The client does not wait for the publisher to be available, goals will start arriving once
    /// a connection is made.
    pub fn new(
        ctx: &zmq::Context, 
        endpoint: &str, 
        topic: &str, 
        goal: GoalState
    ) -> Result<Self, GoalClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            heartbeat_ivl: 1000,
            heartbeat_ttl: 3000,
            heartbeat_timeout: 3000,
            linger: 0,
            reconnect_ivl: RECONNECT_MIN_MS,
            reconnect_ivl_max: RECONNECT_MAX_MS,
            recv_timeout: RECV_TIMEOUT_MS,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx, 
            zmq::SUB, 
            socket_options, 
            endpoint
        ).map_err(GoalClientError::SocketError)?;

        socket.set_subscribe(topic.as_bytes())
            .map_err(GoalClientError::SubscribeError)?;

        info!("GoalClient subscribed to \"{}\" on {}", topic, endpoint);

        let bg_run = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(GoalClientStats::default());

        let bg_run_clone = bg_run.clone();
        let stats_clone = stats.clone();
        let topic = topic.as_bytes().to_vec();

        let bg_jh = Some(thread::spawn(move || {
            bg_thread(socket, topic, bg_run_clone, goal, stats_clone)
        }));

        Ok(Self {
            bg_jh,
            bg_run,
            stats
        })
    }

    /// Number of goals accepted so far.
    pub fn num_accepted(&self) -> u64 {
        self.stats.num_accepted.load(Ordering::Relaxed)
    }

    /// Number of malformed messages rejected so far.
    pub fn num_rejected(&self) -> u64 {
        self.stats.num_rejected.load(Ordering::Relaxed)
    }

    /// Stop the background thread and close the subscription.
    pub fn stop(mut self) {
        self.stop_bg();
        info!("GoalClient stopped");
    }

    fn stop_bg(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("GoalClient background thread panicked");
            }
        }
    }
}

impl Drop for GoalClient {
    fn drop(&mut self) {
        self.stop_bg();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a raw goal payload to the goal state.
///
/// Returns the parsed goal if it was applied. On error the goal state is left untouched.
pub fn apply_goal_payload(goal: &GoalState, payload: &[u8]) -> Result<GoalMsg, GoalParseError> {
    let msg = GoalMsg::from_payload(payload)?;

    goal.set(msg.x, msg.y, msg.seq, msg.t_ms);

    Ok(msg)
}

/// True for receive errors after which the thread should keep receiving: timeouts, and
/// interruptions by a signal such as Ctrl-C being handled.
fn is_transient(e: &zmq::Error) -> bool {
    matches!(e, zmq::Error::EAGAIN | zmq::Error::EINTR)
}

/// Background thread, receives goals until asked to stop.
fn bg_thread(
    socket: MonitoredSocket,
    topic: Vec<u8>,
    run: Arc<AtomicBool>,
    goal: GoalState,
    stats: Arc<GoalClientStats>
) {
    while run.load(Ordering::Relaxed) {
        let mut frames = match socket.recv_multipart(0) {
            Ok(f) => f,
            Err(e) if is_transient(&e) => continue,
            Err(zmq::Error::ETERM) => {
                debug!("GoalClient context terminated");
                break
            },
            Err(e) => {
                error!("Error receiving goal: {}", e);
                break
            }
        };

        // Frames must be exactly [topic, payload]
        if frames.len() != 2 || frames[0] != topic {
            stats.num_rejected.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Ignoring message with {} frames on topic {:?}",
                frames.len(),
                frames.first().map(|t| payload_excerpt(t))
            );
            continue;
        }

        let payload = frames.swap_remove(1);

        match apply_goal_payload(&goal, &payload) {
            Ok(msg) => {
                stats.num_accepted.fetch_add(1, Ordering::Relaxed);
                match msg.t_ms {
                    Some(t_ms) => trace!(
                        "New goal: {:?}, latency {} ms", 
                        msg, 
                        Utc::now().timestamp_millis() - t_ms
                    ),
                    None => trace!("New goal: {:?}", msg)
                }
            },
            Err(e) => {
                stats.num_rejected.fetch_add(1, Ordering::Relaxed);
                warn!("Invalid goal message: {} | raw={:?}", e, payload_excerpt(&payload));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_apply_valid_goal() {
        let goal = GoalState::default();

        apply_goal_payload(
            &goal,
            br#"{"x": -250.0, "y": -100.0, "seq": 10684, "t_ms": 1771014229675}"#
        ).unwrap();

        let snapshot = goal.snapshot();
        assert_eq!(snapshot.x, -250);
        assert_eq!(snapshot.y, -100);
        assert_eq!(snapshot.sequence, Some(10684));
        assert_eq!(snapshot.source_timestamp_ms, Some(1771014229675));
    }

    #[test]
    fn test_apply_truncates() {
        let goal = GoalState::default();

        apply_goal_payload(&goal, br#"{"x": 99.99, "y": -3.7}"#).unwrap();

        let snapshot = goal.snapshot();
        assert_eq!((snapshot.x, snapshot.y), (99, -3));
    }

    #[test]
    fn test_malformed_goals_leave_state_untouched() {
        let goal = GoalState::default();
        apply_goal_payload(&goal, br#"{"x": 40, "y": 50, "seq": 1}"#).unwrap();
        let before = goal.snapshot();

        let bad: &[&[u8]] = &[
            b"{\"x\": 1",
            br#"{"y": 2}"#,
            br#"{"x": 1}"#,
            br#"{"x": "left", "y": 2}"#,
            br#"{"x": 1, "y": [2]}"#,
            b"[1, 2]",
            &[0xc3, 0x28],
        ];

        for payload in bad {
            assert!(apply_goal_payload(&goal, payload).is_err());
            assert_eq!(goal.snapshot(), before);
        }
    }

    #[test]
    fn test_transient_recv_errors() {
        assert!(is_transient(&zmq::Error::EAGAIN));
        assert!(is_transient(&zmq::Error::EINTR));
        assert!(!is_transient(&zmq::Error::ETERM));
        assert!(!is_transient(&zmq::Error::ENOTSOCK));
    }

    /// Publish the goal repeatedly until it shows up in the goal state.
    fn publish_until_received(
        publisher: &zmq::Socket, 
        goal: &GoalState, 
        x: f64, 
        timeout: Duration
    ) -> bool {
        let payload = GoalMsg { x, y: 0.0, seq: None, t_ms: None }.to_payload().unwrap();
        let start = Instant::now();

        while start.elapsed() < timeout {
            publisher.send_multipart(vec![&b"test/goal"[..], &payload[..]], 0).unwrap();
            thread::sleep(Duration::from_millis(50));

            if goal.snapshot().x == x as i64 {
                return true
            }
        }

        false
    }

    /// Bind a publisher, retrying while the previous one releases the port.
    fn bind_publisher(ctx: &zmq::Context, endpoint: &str) -> zmq::Socket {
        let publisher = ctx.socket(zmq::PUB).unwrap();
        publisher.set_linger(0).unwrap();

        let start = Instant::now();
        loop {
            match publisher.bind(endpoint) {
                Ok(()) => return publisher,
                Err(e) if start.elapsed() > Duration::from_secs(5) => {
                    panic!("Could not bind publisher: {}", e)
                },
                Err(_) => thread::sleep(Duration::from_millis(50))
            }
        }
    }

    #[test]
    fn test_goals_survive_reconnect() {
        const ENDPOINT: &str = "tcp://127.0.0.1:47311";

        let ctx = zmq::Context::new();
        let goal = GoalState::default();

        let client = GoalClient::new(&ctx, ENDPOINT, "test/goal", goal.clone()).unwrap();

        // First publisher
        {
            let publisher = bind_publisher(&ctx, ENDPOINT);
            assert!(publish_until_received(&publisher, &goal, 10.0, Duration::from_secs(10)));
        }

        // Publisher has gone away, the goal is held
        thread::sleep(Duration::from_millis(200));
        assert_eq!(goal.snapshot().x, 10);

        // Second publisher on the same endpoint, the client must pick it up without any manual
        // resubscription
        let publisher = bind_publisher(&ctx, ENDPOINT);
        assert!(publish_until_received(&publisher, &goal, 20.0, Duration::from_secs(15)));

        // Messages on other topics are filtered out by the subscription
        publisher.send_multipart(vec![&b"other/topic"[..], &br#"{"x": 99, "y": 0}"#[..]], 0)
            .unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(goal.snapshot().x, 20);
        assert_eq!(client.num_rejected(), 0);

        // Topics which only share a prefix pass the subscription but are still rejected, as are
        // messages without a payload frame
        publisher.send_multipart(vec![&b"test/goal_other"[..], &br#"{"x": 77, "y": 0}"#[..]], 0)
            .unwrap();
        publisher.send(&br#"test/goal{"x": 78, "y": 0}"#[..], 0).unwrap();
        let start = Instant::now();
        while client.num_rejected() < 2 && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(client.num_rejected(), 2);
        assert_eq!(goal.snapshot().x, 20);

        // Malformed goals are counted and dropped
        publisher.send_multipart(vec![&b"test/goal"[..], &b"garbage"[..]], 0).unwrap();
        let start = Instant::now();
        while client.num_rejected() < 3 && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(client.num_rejected(), 3);
        assert_eq!(goal.snapshot().x, 20);
        assert!(client.num_accepted() >= 2);

        client.stop();
    }
}
