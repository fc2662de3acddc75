//! Outbound sinks: ZMQ XPUB for the JSON message set, UDP for CoT events.
//!
//! Both are fire-and-forget with at-most-once delivery: a send failure is
//! logged and the record is not retried. Slow or absent subscribers never
//! block the producer.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use droneid_core::config::{CotConfig, PublishConfig};
use droneid_core::{DroneIdError, Result};

use crate::pipeline::PublishSink;

// ---------------------------------------------------------------------------
// JSON publisher (ZMQ XPUB)
// ---------------------------------------------------------------------------

pub struct JsonPublisher {
    socket: zmq::Socket,
    endpoint: String,
}

impl JsonPublisher {
    /// Bind the XPUB socket on the configured endpoint.
    pub fn bind(ctx: &zmq::Context, cfg: &PublishConfig) -> Result<Self> {
        let endpoint = format!("tcp://{}:{}", cfg.zmq_pub_ip, cfg.zmq_pub_port);
        let socket = ctx
            .socket(zmq::XPUB)
            .map_err(|e| DroneIdError::Publish(e.to_string()))?;
        socket
            .bind(&endpoint)
            .map_err(|e| DroneIdError::Publish(format!("bind {endpoint}: {e}")))?;
        log::info!("ZMQ XPUB socket bound to {endpoint}");
        Ok(JsonPublisher { socket, endpoint })
    }

    pub fn send(&self, body: &str) {
        if let Err(e) = self.socket.send(body, 0) {
            log::warn!("ZMQ publish on {} failed: {e}", self.endpoint);
        } else {
            log::debug!("published JSON: {body}");
        }
    }
}

// ---------------------------------------------------------------------------
// CoT publisher (UDP unicast or multicast)
// ---------------------------------------------------------------------------

/// Static CoT destination, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CotDestination {
    Unicast(SocketAddr),
    Multicast { group: Ipv4Addr, port: u16 },
}

impl CotDestination {
    /// Resolve the destination from config: multicast group when enabled,
    /// unicast TAK server otherwise.
    pub fn from_config(cfg: &CotConfig) -> Result<Self> {
        if cfg.multicast {
            let group: Ipv4Addr = cfg
                .multicast_ip
                .parse()
                .map_err(|_| DroneIdError::Config(format!("bad multicast_ip {}", cfg.multicast_ip)))?;
            Ok(CotDestination::Multicast {
                group,
                port: cfg.multicast_port,
            })
        } else {
            let addr = format!("{}:{}", cfg.tak_server_ip, cfg.tak_server_port);
            addr.parse()
                .map(CotDestination::Unicast)
                .map_err(|_| DroneIdError::Config(format!("bad TAK server address {addr}")))
        }
    }
}

pub struct CotPublisher {
    socket: UdpSocket,
    target: SocketAddr,
}

impl CotPublisher {
    pub fn new(dest: CotDestination) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let target = match dest {
            CotDestination::Unicast(addr) => addr,
            CotDestination::Multicast { group, port } => {
                socket.set_multicast_ttl_v4(1)?;
                SocketAddr::from((group, port))
            }
        };
        Ok(CotPublisher { socket, target })
    }

    pub fn send(&self, body: &str) {
        match self.socket.send_to(body.as_bytes(), self.target) {
            Ok(_) => log::debug!("CoT event sent to {}", self.target),
            Err(e) => log::warn!("CoT send to {} failed: {e}", self.target),
        }
    }
}

// ---------------------------------------------------------------------------
// Combined sink
// ---------------------------------------------------------------------------

/// The daemon's real sink pair.
pub struct Publishers {
    pub json: JsonPublisher,
    pub cot: CotPublisher,
}

impl PublishSink for Publishers {
    fn send_json(&mut self, body: &str) {
        self.json.send(body);
    }

    fn send_cot(&mut self, body: &str) {
        self.cot.send(body);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
