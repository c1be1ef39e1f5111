//! # Mechanisms Client
//!
//! This module provides networking abstractions to connect to the mechanisms server, which owns
//! the wireless link to the robot and forwards wheel demands to it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions, MonitoredSocketError}, 
    eqpt::mech::{MechCmd, MechDemsResponse, WheelDems}
};
use log::info;

use crate::cycle_mgr::ActuationSink;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct MechClient {
    dems_socket: Option<MonitoredSocket>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MechClientError {

    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the server")]
    NotConnected,

    #[error("The client has been disconnected")]
    Disconnected,

    #[error("Could not send demands to the server: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the data: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the server: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The server rejected the demands: {0:?}")]
    Rejected(MechDemsResponse),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MechClient {
    /// Create a new instance of the mechanisms client.
    ///
    /// Blocks until the server is connected or the timeout expires. Sends and receives are also
    /// bounded by `timeout_ms`, so a stalled server can't hang the control cycle.
    pub fn new(
        ctx: &zmq::Context, 
        endpoint: &str, 
        timeout_ms: i32
    ) -> Result<Self, MechClientError> {
        
        // Create the socket options
        let dems_socket_options = SocketOptions {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: timeout_ms,
            send_timeout: timeout_ms,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        // Create the socket
        let dems_socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            dems_socket_options,
            endpoint
        ).map_err(MechClientError::SocketError)?;

        // Create self
        Ok(Self {
            dems_socket: Some(dems_socket)
        })
    }

    /// Send a command to the server and wait for its response.
    fn send_cmd(&mut self, cmd: &MechCmd) -> Result<MechDemsResponse, MechClientError> {
        let socket = self.dems_socket.as_ref().ok_or(MechClientError::Disconnected)?;

        // If not connected return now
        if !socket.connected() {
            return Err(MechClientError::NotConnected)
        }

        // Serialize the command
        let cmd_str = serde_json::to_string(cmd)
            .map_err(MechClientError::SerializationError)?;

        // Send the command to the server
        socket.send(&cmd_str, 0)
            .map_err(MechClientError::SendError)?;
        
        // Recieve response back from the server
        let msg = socket.recv_msg(0)
            .map_err(MechClientError::RecvError)?;

        serde_json::from_str(msg.as_str().unwrap_or(""))
            .map_err(MechClientError::DeserializeError)
    }

    /// Send demands to the server.
    ///
    /// If the server acknowledges the demands within the configured timeout then `Ok()` is
    /// returned, otherwise an `Err()` is returned.
    pub fn send_demands(&mut self, demands: &WheelDems) -> Result<(), MechClientError> {
        match self.send_cmd(&MechCmd::Dems(*demands))? {
            MechDemsResponse::DemsOk => Ok(()),
            r => Err(MechClientError::Rejected(r))
        }
    }
}

impl ActuationSink for MechClient {
    type Error = MechClientError;

    fn send(&mut self, dems: &WheelDems) -> Result<(), Self::Error> {
        self.send_demands(dems)
    }

    /// Tell the server to release the robot link, then close the socket.
    fn disconnect(&mut self) -> Result<(), Self::Error> {
        let result = self.send_cmd(&MechCmd::Disconnect).map(|_| ());

        if self.dems_socket.take().is_some() {
            info!("MechClient disconnected");
        }

        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    /// Serve `n` requests, replying with `response` and returning the commands received.
    fn serve(
        ctx: &zmq::Context, 
        endpoint: &'static str, 
        n: usize, 
        response: MechDemsResponse
    ) -> thread::JoinHandle<Vec<MechCmd>> {
        let server = ctx.socket(zmq::REP).unwrap();
        server.set_linger(0).unwrap();
        server.bind(endpoint).unwrap();

        thread::spawn(move || {
            let mut cmds = Vec::new();
            for _ in 0..n {
                let msg = server.recv_string(0).unwrap().unwrap();
                cmds.push(serde_json::from_str(&msg).unwrap());
                server.send(&serde_json::to_string(&response).unwrap(), 0).unwrap();
            }
            cmds
        })
    }

    #[test]
    fn test_send_and_disconnect() {
        const ENDPOINT: &str = "tcp://127.0.0.1:47331";

        let ctx = zmq::Context::new();
        let server = serve(&ctx, ENDPOINT, 2, MechDemsResponse::DemsOk);

        let mut client = MechClient::new(&ctx, ENDPOINT, 2000).unwrap();
        let dems = WheelDems { right_rads: 150.0, left_rads: -10.0 };

        client.send(&dems).unwrap();
        client.disconnect().unwrap();

        assert_eq!(server.join().unwrap(), vec![MechCmd::Dems(dems), MechCmd::Disconnect]);

        // Nothing can be sent after disconnecting
        match client.send(&dems) {
            Err(MechClientError::Disconnected) => (),
            r => panic!("Expected Disconnected, got {:?}", r)
        }
    }

    #[test]
    fn test_rejected_demands() {
        const ENDPOINT: &str = "tcp://127.0.0.1:47332";

        let ctx = zmq::Context::new();
        let server = serve(&ctx, ENDPOINT, 1, MechDemsResponse::EqptInvalid);

        let mut client = MechClient::new(&ctx, ENDPOINT, 2000).unwrap();

        match client.send(&WheelDems::stop()) {
            Err(MechClientError::Rejected(MechDemsResponse::EqptInvalid)) => (),
            r => panic!("Expected Rejected, got {:?}", r)
        }

        server.join().unwrap();
    }
}
