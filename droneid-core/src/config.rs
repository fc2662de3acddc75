//! Configuration for the receiver daemon.
//!
//! Loaded from a `key = value` text file (`config.txt`). Unknown keys are
//! ignored; malformed values fall back to the defaults so a bad config line
//! never stops the daemon.

use std::path::Path;

use crate::validate::{ValidationLimits, DEFAULT_MAX_HORIZONTAL_SPEED, DEFAULT_MIN_SERIAL_LEN};

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub stream: StreamConfig,
    pub publish: PublishConfig,
    pub gps: GpsFeedConfig,
    pub cot: CotConfig,
    pub limits: ValidationLimits,
}

/// Primary AntSDR byte stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub server_ip: String,
    pub server_port: u16,
    /// Fixed backoff between reconnect attempts.
    pub reconnect_delay_secs: u64,
}

/// ZMQ XPUB endpoint for the JSON message set.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishConfig {
    pub zmq_pub_ip: String,
    pub zmq_pub_port: u16,
}

/// Auxiliary host-sensor GPS feed (ZMQ SUB).
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFeedConfig {
    pub endpoint: String,
    /// Receive-timeout backstop for the per-iteration poll.
    pub poll_timeout_ms: u32,
}

/// CoT UDP destination: unicast TAK server, or a multicast group.
#[derive(Debug, Clone, PartialEq)]
pub struct CotConfig {
    pub tak_server_ip: String,
    pub tak_server_port: u16,
    pub multicast: bool,
    pub multicast_ip: String,
    pub multicast_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stream: StreamConfig {
                server_ip: "172.31.100.2".into(),
                server_port: 41030,
                reconnect_delay_secs: 5,
            },
            publish: PublishConfig {
                zmq_pub_ip: "127.0.0.1".into(),
                zmq_pub_port: 4221,
            },
            gps: GpsFeedConfig {
                endpoint: "tcp://127.0.0.1:4224".into(),
                poll_timeout_ms: 100,
            },
            cot: CotConfig {
                tak_server_ip: "0.0.0.0".into(),
                tak_server_port: 6666,
                multicast: false,
                multicast_ip: "239.2.3.1".into(),
                multicast_port: 6969,
            },
            limits: ValidationLimits {
                max_horizontal_speed: DEFAULT_MAX_HORIZONTAL_SPEED,
                min_serial_len: DEFAULT_MIN_SERIAL_LEN,
            },
        }
    }
}

/// Load config from a `key = value` file.
///
/// Returns the defaults when the file is missing or unreadable.
pub fn load_config(path: &Path) -> Config {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("config {} not loaded ({e}), using defaults", path.display());
            return Config::default();
        }
    };
    parse_config(&text)
}

/// Parse `key = value` lines. Blank lines and `#` comments are skipped.
pub fn parse_config(text: &str) -> Config {
    let mut config = Config::default();

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        let Some((key, val)) = stripped.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        match key {
            "server_ip" => config.stream.server_ip = val.to_string(),
            "server_port" => set_parsed(&mut config.stream.server_port, val),
            "reconnect_delay_secs" => set_parsed(&mut config.stream.reconnect_delay_secs, val),
            "zmq_pub_ip" => config.publish.zmq_pub_ip = val.to_string(),
            "zmq_pub_port" => set_parsed(&mut config.publish.zmq_pub_port, val),
            "gps_sub_endpoint" => config.gps.endpoint = val.to_string(),
            "gps_poll_timeout_ms" => set_parsed(&mut config.gps.poll_timeout_ms, val),
            "tak_server_ip" => config.cot.tak_server_ip = val.to_string(),
            "tak_server_port" => set_parsed(&mut config.cot.tak_server_port, val),
            "multicast" => config.cot.multicast = parse_bool(val, config.cot.multicast),
            "multicast_ip" => config.cot.multicast_ip = val.to_string(),
            "multicast_port" => set_parsed(&mut config.cot.multicast_port, val),
            "max_horizontal_speed" => set_parsed(&mut config.limits.max_horizontal_speed, val),
            "min_serial_length" => set_parsed(&mut config.limits.min_serial_len, val),
            _ => log::debug!("ignoring unknown config key {key}"),
        }
    }

    config
}

fn set_parsed<T: std::str::FromStr>(target: &mut T, val: &str) {
    if let Ok(parsed) = val.parse() {
        *target = parsed;
    }
}

fn parse_bool(val: &str, default: bool) -> bool {
    match val.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
