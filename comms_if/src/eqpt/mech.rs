//! # Mechanisms Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Wheel rate demands for a differential drive robot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDems {
    /// Right wheel angular rate demand.
    ///
    /// Units: robot wheel rate units, bounded by the configured maximum wheel rate
    pub right_rads: f64,

    /// Left wheel angular rate demand.
    ///
    /// Units: robot wheel rate units, bounded by the configured maximum wheel rate
    pub left_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Commands sent from the MechClient to the MechServer
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum MechCmd {
    /// Drive the wheels at the given rates
    Dems(WheelDems),

    /// Stop using the robot link. The server releases its connection to the robot.
    Disconnect,
}

/// Response from the mechanisms server based on the command sent by the client.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum MechDemsResponse {
    /// Demands were valid and will be executed
    DemsOk,

    /// Demands were invalid and have been rejected
    DemsInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl WheelDems {
    /// Demands which stop both wheels.
    pub fn stop() -> Self {
        Self::default()
    }

    /// True if both wheel demands are zero.
    pub fn is_stop(&self) -> bool {
        self.right_rads == 0.0 && self.left_rads == 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mech_cmd_json() {
        let cmd = MechCmd::Dems(WheelDems { right_rads: 150.0, left_rads: -10.0 });
        let s = serde_json::to_string(&cmd).unwrap();
        assert_eq!(s, r#"{"Dems":{"right_rads":150.0,"left_rads":-10.0}}"#);

        assert_eq!(serde_json::to_string(&MechCmd::Disconnect).unwrap(), r#""Disconnect""#);

        let rep: MechDemsResponse = serde_json::from_str(r#""DemsOk""#).unwrap();
        assert_eq!(rep, MechDemsResponse::DemsOk);
    }

    #[test]
    fn test_stop() {
        assert!(WheelDems::stop().is_stop());
        assert!(!WheelDems { right_rads: 0.0, left_rads: 1.0 }.is_stop());
    }
}
