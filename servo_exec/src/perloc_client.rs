//! # Perloc Client
//!
//! The perloc client receives marker detections streamed by the marker tracking exec
//! (Perception-Localisation). The socket is conflated so only the newest frame is ever read, older
//! frames are dropped rather than queued.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::perloc::MarkerFrame,
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::{info, warn};

use crate::loc::{Detections, LocError, MarkerDetector};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The perloc client
pub struct PerlocClient {
    /// Detections stream subscriber socket
    stream: Option<MonitoredSocket>,
}

#[derive(Debug, thiserror::Error)]
pub enum PerlocClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to the detections stream: {0}")]
    SubscribeError(zmq::Error),

    #[error("The client has been released")]
    Released,

    #[error("Could not recieve a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("The server sent a message which was not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not deserialize the detections from the server: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PerlocClient {
    /// Connect to the detections stream.
    ///
    /// `frame_timeout_ms` is the longest [`PerlocClient::receive_frame`] will wait for a frame.
    pub fn new(
        ctx: &zmq::Context, 
        endpoint: &str, 
        frame_timeout_ms: i32
    ) -> Result<Self, PerlocClientError> {
        let stream_opts = SocketOptions {
            block_on_first_connect: false,
            conflate: true,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 0,
            recv_timeout: frame_timeout_ms,
            ..Default::default()
        };

        let stream = MonitoredSocket::new(ctx, zmq::SUB, stream_opts, endpoint)
            .map_err(PerlocClientError::SocketError)?;

        stream.set_subscribe(b"")
            .map_err(PerlocClientError::SubscribeError)?;

        info!("PerlocClient listening for detections on {}", endpoint);

        Ok(Self {
            stream: Some(stream)
        })
    }

    /// Get the newest frame of detections.
    ///
    /// If no frame arrives within the frame timeout `Ok(None)` is returned.
    pub fn receive_frame(&mut self) -> Result<Option<MarkerFrame>, PerlocClientError> {
        let stream = self.stream.as_ref().ok_or(PerlocClientError::Released)?;

        let msg = match stream.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(PerlocClientError::NonUtf8Message),
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(PerlocClientError::RecvError(e)),
        };

        serde_json::from_str(&msg)
            .map(Some)
            .map_err(PerlocClientError::DeserializeError)
    }
}

impl MarkerDetector for PerlocClient {
    /// Sequence number of the camera frame, if a frame was received.
    type Frame = Option<u64>;

    fn detect(&mut self) -> Result<Detections<Self::Frame>, LocError> {
        match self.receive_frame() {
            Ok(Some(frame)) => Ok(Detections {
                frame: Some(frame.frame_seq),
                corners: frame.corners,
                ids: frame.ids
            }),
            Ok(None) => Ok(Detections::default()),
            // A bad frame is only a missed detection
            Err(PerlocClientError::DeserializeError(e)) => {
                warn!("Could not deserialize detections: {}", e);
                Ok(Detections::default())
            },
            Err(e) => Err(LocError::DetectorError(e.to_string()))
        }
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            info!("PerlocClient released");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{thread, time::{Duration, Instant}};

    #[test]
    fn test_receive_detections() {
        const ENDPOINT: &str = "tcp://127.0.0.1:47321";

        let ctx = zmq::Context::new();
        let publisher = ctx.socket(zmq::PUB).unwrap();
        publisher.set_linger(0).unwrap();
        publisher.bind(ENDPOINT).unwrap();

        let mut client = PerlocClient::new(&ctx, ENDPOINT, 50).unwrap();

        let frame = MarkerFrame {
            frame_seq: 12,
            timestamp_ms: None,
            corners: vec![[[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]]],
            ids: vec![1]
        };
        let frame_str = serde_json::to_string(&frame).unwrap();

        // Keep publishing until the subscription has propagated
        let start = Instant::now();
        let mut detections = Detections::default();
        while detections.ids.is_empty() && start.elapsed() < Duration::from_secs(10) {
            publisher.send(&frame_str, 0).unwrap();
            thread::sleep(Duration::from_millis(20));
            detections = client.detect().unwrap();
        }

        assert_eq!(detections.frame, Some(12));
        assert_eq!(detections.ids, vec![1]);
        assert_eq!(detections.corners, frame.corners);

        // Garbage is a missed detection, not an error
        publisher.send("not a frame", 0).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(client.detect().unwrap().ids.is_empty());

        // After release the detector reports an error
        client.release();
        assert!(client.detect().is_err());
    }
}
