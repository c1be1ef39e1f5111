//! # Goal Messages
//!
//! Goals are published on a single topic as UTF-8 JSON objects:
//!
//! ```json
//! {"x": -250.0, "y": -100.0, "seq": 10684, "t_ms": 1771014229675}
//! ```
//!
//! `x` and `y` are pixel offsets from the centre of the camera frame. `seq` and `t_ms` are
//! optional and assigned by the sender. Unknown fields are ignored.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The default topic goals are published on.
pub const DEFAULT_GOAL_TOPIC: &str = "huber/robot/goal";

/// Maximum number of bytes of a raw payload included in error messages.
pub const MAX_EXCERPT_LEN: usize = 200;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A goal message as it appears on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GoalMsg {
    /// Desired x position relative to the frame centre.
    ///
    /// Units: pixels
    pub x: f64,

    /// Desired y position relative to the frame centre.
    ///
    /// Units: pixels
    pub y: f64,

    /// Sender assigned sequence number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<i64>,

    /// Sender side timestamp.
    ///
    /// Units: milliseconds since the unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ms: Option<i64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Reasons a goal payload can be rejected.
#[derive(Debug, thiserror::Error)]
pub enum GoalParseError {
    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(std::str::Utf8Error),

    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Invalid goal fields: {0}")]
    InvalidFields(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GoalMsg {
    /// Parse a goal message from a raw payload.
    ///
    /// The payload must be a UTF-8 JSON object containing numeric `x` and `y` fields. `seq` and
    /// `t_ms` must be integers if present.
    pub fn from_payload(payload: &[u8]) -> Result<Self, GoalParseError> {
        let text = std::str::from_utf8(payload)
            .map_err(GoalParseError::InvalidUtf8)?
            .trim();

        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(GoalParseError::InvalidJson)?;

        // Structs deserialize from JSON arrays too, so check for an object first
        let kind = match value {
            serde_json::Value::Object(_) => None,
            serde_json::Value::Null => Some("null"),
            serde_json::Value::Bool(_) => Some("a boolean"),
            serde_json::Value::Number(_) => Some("a number"),
            serde_json::Value::String(_) => Some("a string"),
            serde_json::Value::Array(_) => Some("an array"),
        };
        if let Some(k) = kind {
            return Err(GoalParseError::NotAnObject(k));
        }

        serde_json::from_value(value).map_err(GoalParseError::InvalidFields)
    }

    /// Serialize the goal into a wire payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get a printable excerpt of a raw payload, at most [`MAX_EXCERPT_LEN`] bytes long.
pub fn payload_excerpt(payload: &[u8]) -> String {
    let end = payload.len().min(MAX_EXCERPT_LEN);
    let mut excerpt = String::from_utf8_lossy(&payload[..end]).into_owned();

    if payload.len() > MAX_EXCERPT_LEN {
        excerpt.push_str("...");
    }

    excerpt
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_full_goal() {
        let msg = GoalMsg::from_payload(
            br#"{"x": -250.0, "y": -100.0, "seq": 10684, "t_ms": 1771014229675}"#
        ).unwrap();

        assert_eq!(msg, GoalMsg {
            x: -250.0,
            y: -100.0,
            seq: Some(10684),
            t_ms: Some(1771014229675)
        });
    }

    #[test]
    fn test_optional_and_extra_fields() {
        let msg = GoalMsg::from_payload(b"  {\"y\": 3, \"x\": 1.5, \"src\": \"llm\"}\n").unwrap();
        assert_eq!(msg, GoalMsg { x: 1.5, y: 3.0, seq: None, t_ms: None });

        let msg = GoalMsg::from_payload(br#"{"x": 1, "y": 2, "seq": null}"#).unwrap();
        assert_eq!(msg.seq, None);
    }

    #[test]
    fn test_rejected_payloads() {
        let bad: &[&[u8]] = &[
            b"",
            b"not json",
            b"{\"x\": 1",
            b"[1, 2]",
            b"42",
            b"null",
            br#"{"y": 2}"#,
            br#"{"x": 1}"#,
            br#"{"x": "1", "y": 2}"#,
            br#"{"x": 1, "y": null}"#,
            br#"{"x": 1, "y": 2, "seq": 1.5}"#,
            br#"{"x": 1, "y": 2, "t_ms": "now"}"#,
            &[0xff, 0xfe, b'{', b'}'],
        ];

        for payload in bad {
            assert!(
                GoalMsg::from_payload(payload).is_err(),
                "Payload {:?} should have been rejected",
                payload_excerpt(payload)
            );
        }

        match GoalMsg::from_payload(b"[1, 2]") {
            Err(GoalParseError::NotAnObject(_)) => (),
            r => panic!("Expected NotAnObject, got {:?}", r)
        }
    }

    #[test]
    fn test_payload_excerpt() {
        assert_eq!(payload_excerpt(b"short"), "short");

        let long = vec![b'a'; 1000];
        let excerpt = payload_excerpt(&long);
        assert_eq!(excerpt.len(), MAX_EXCERPT_LEN + 3);
        assert!(excerpt.ends_with("..."));
    }
}
