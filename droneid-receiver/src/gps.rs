//! Auxiliary host-sensor GPS feed (ZMQ SUB).
//!
//! Best-effort: each pipeline iteration drains a bounded number of pending
//! messages into the cache so it reflects the freshest available fix
//! without ever blocking the primary pipeline.

use chrono::Utc;

use droneid_core::config::GpsFeedConfig;
use droneid_core::sensor::{self, AuxPositionCache, AuxiliaryPosition};
use droneid_core::{DroneIdError, Result};

use crate::pipeline::AuxSource;

/// Messages drained per poll. Bounds the per-iteration work; anything left
/// over is picked up next iteration.
pub const MAX_DRAIN_PER_POLL: usize = 4;

pub struct GpsFeed {
    socket: zmq::Socket,
}

impl GpsFeed {
    /// Connect the SUB socket. The configured receive timeout is only a
    /// backstop; drains use non-blocking receives.
    pub fn connect(ctx: &zmq::Context, cfg: &GpsFeedConfig) -> Result<Self> {
        let socket = ctx
            .socket(zmq::SUB)
            .map_err(|e| DroneIdError::Config(e.to_string()))?;
        socket
            .set_subscribe(b"")
            .map_err(|e| DroneIdError::Config(e.to_string()))?;
        socket
            .set_rcvtimeo(cfg.poll_timeout_ms as i32)
            .map_err(|e| DroneIdError::Config(e.to_string()))?;
        socket
            .connect(&cfg.endpoint)
            .map_err(|e| DroneIdError::Config(format!("connect {}: {e}", cfg.endpoint)))?;
        log::info!("subscribed to sensor GPS feed at {}", cfg.endpoint);
        Ok(GpsFeed { socket })
    }
}

impl AuxSource for GpsFeed {
    fn poll(&mut self, cache: &AuxPositionCache) {
        for _ in 0..MAX_DRAIN_PER_POLL {
            match self.socket.recv_string(zmq::DONTWAIT) {
                Ok(Ok(text)) => {
                    if let Some((lat, lon, alt)) = sensor::parse_position_message(&text) {
                        cache.update(AuxiliaryPosition {
                            lat,
                            lon,
                            alt,
                            observed_at: Utc::now(),
                        });
                    }
                }
                // Non-UTF8 message: not a position update, skip it
                Ok(Err(_)) => continue,
                // Would-block: nothing pending
                Err(_) => break,
            }
        }
    }
}
