//! # Goal module
//!
//! Holds the latest goal commanded to the robot. The goal is written by the
//! [`GoalClient`](crate::goal_client::GoalClient) background thread and read by the
//! [`CycleMgr`](crate::cycle_mgr::CycleMgr) once per cycle.
//!
//! All fields of the goal are stored together under a single lock, so a snapshot never contains
//! a partially updated goal. The lock is only held for the duration of a copy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single goal, as seen by the control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal {
    /// Desired x position relative to the frame centre, truncated to a whole pixel.
    ///
    /// Units: pixels
    pub x: i64,

    /// Desired y position relative to the frame centre, truncated to a whole pixel.
    ///
    /// Units: pixels
    pub y: i64,

    /// Sender assigned sequence number, not checked for monotonicity.
    pub sequence: Option<i64>,

    /// Sender side timestamp.
    ///
    /// Units: milliseconds since the unix epoch
    pub source_timestamp_ms: Option<i64>,

    /// Local monotonic time at which this goal was set.
    pub received_at: Instant,
}

/// Shared container for the latest goal.
///
/// Cloning a `GoalState` produces another handle to the same goal.
#[derive(Debug, Clone)]
pub struct GoalState {
    goal: Arc<Mutex<Goal>>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Goal {
    /// Time elapsed since the goal was set.
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }

    /// The goal position as floating point pixel coordinates.
    pub fn position(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl GoalState {
    /// Create a new goal state holding the given default goal.
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            goal: Arc::new(Mutex::new(Goal {
                x,
                y,
                sequence: None,
                source_timestamp_ms: None,
                received_at: Instant::now()
            }))
        }
    }

    /// Replace the goal.
    ///
    /// Fractional parts of `x` and `y` are discarded (truncation toward zero). The local receipt
    /// time is recorded.
    pub fn set(&self, x: f64, y: f64, sequence: Option<i64>, source_timestamp_ms: Option<i64>) {
        let goal = Goal {
            x: x.trunc() as i64,
            y: y.trunc() as i64,
            sequence,
            source_timestamp_ms,
            received_at: Instant::now()
        };

        *self.lock() = goal;
    }

    /// Get a copy of the current goal.
    pub fn snapshot(&self) -> Goal {
        *self.lock()
    }

    /// Lock the goal.
    ///
    /// Every write replaces the whole goal, so the value behind a poisoned lock is still
    /// consistent and is recovered rather than propagating the panic.
    fn lock(&self) -> MutexGuard<'_, Goal> {
        self.goal.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for GoalState {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_default_goal() {
        let state = GoalState::new(10, -20);
        let goal = state.snapshot();

        assert_eq!((goal.x, goal.y), (10, -20));
        assert_eq!(goal.sequence, None);
        assert_eq!(goal.source_timestamp_ms, None);
    }

    #[test]
    fn test_set_truncates() {
        let state = GoalState::default();

        state.set(12.9, -7.9, Some(3), Some(1000));
        let goal = state.snapshot();
        assert_eq!((goal.x, goal.y), (12, -7));
        assert_eq!(goal.sequence, Some(3));
        assert_eq!(goal.source_timestamp_ms, Some(1000));

        state.set(-0.5, 0.999, None, None);
        let goal = state.snapshot();
        assert_eq!((goal.x, goal.y), (0, 0));
        assert_eq!(goal.sequence, None);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let state = GoalState::default();
        state.set(5.0, 6.0, Some(1), None);

        let first = state.snapshot();
        for _ in 0..10 {
            assert_eq!(state.snapshot(), first);
        }
    }

    #[test]
    fn test_set_records_receipt_time() {
        let state = GoalState::default();
        let before = state.snapshot().received_at;

        thread::sleep(Duration::from_millis(5));
        state.set(1.0, 1.0, None, None);

        assert!(state.snapshot().received_at > before);
        assert!(state.snapshot().age() < Duration::from_secs(5));
    }

    #[test]
    fn test_snapshots_are_never_torn() {
        let state = GoalState::default();
        let writer_state = state.clone();

        // The writer always sets x == y == seq, so any snapshot with mismatched fields would be a
        // torn read
        let writer = thread::spawn(move || {
            for i in 0..10_000i64 {
                writer_state.set(i as f64, i as f64, Some(i), Some(i));
            }
        });

        for _ in 0..10_000 {
            let goal = state.snapshot();
            assert_eq!(goal.x, goal.y);
            if let Some(seq) = goal.sequence {
                assert_eq!(seq, goal.x);
                assert_eq!(goal.source_timestamp_ms, Some(seq));
            }
        }

        writer.join().unwrap();
        assert_eq!(state.snapshot().x, 9_999);
    }
}
