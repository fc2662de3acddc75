//! Host-sensor GPS position: single-slot cache plus feed-message parsing.
//!
//! The cache holds the most recent known-good fix from the best-effort
//! auxiliary feed. It is the only state shared between the feed drain and
//! the main pipeline: writes overwrite the slot wholesale, reads take a
//! snapshot, and neither waits on the other beyond the mutex hand-off.
//! Entries never expire — staleness is accepted, corruption is not.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::is_valid_latlon;

/// One host-sensor GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuxiliaryPosition {
    pub lat: f64,
    pub lon: f64,
    /// Altitude, meters. 0.0 when the feed omits it.
    pub alt: f64,
    pub observed_at: DateTime<Utc>,
}

/// Process-wide single-slot store of the most recent valid sensor fix.
#[derive(Debug, Default)]
pub struct AuxPositionCache {
    slot: Mutex<Option<AuxiliaryPosition>>,
}

impl AuxPositionCache {
    pub fn new() -> Self {
        AuxPositionCache::default()
    }

    /// Overwrite the slot iff the candidate is in range and not (0, 0).
    /// Returns whether the candidate was accepted.
    pub fn update(&self, candidate: AuxiliaryPosition) -> bool {
        if !is_valid_latlon(candidate.lat, candidate.lon) {
            log::debug!(
                "ignoring invalid sensor fix ({}, {})",
                candidate.lat,
                candidate.lon
            );
            return false;
        }
        *self.slot.lock().unwrap() = Some(candidate);
        true
    }

    /// Current fix, or `None` if never populated.
    pub fn snapshot(&self) -> Option<AuxiliaryPosition> {
        *self.slot.lock().unwrap()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().unwrap().is_none()
    }
}

// ---------------------------------------------------------------------------
// Feed message parsing
// ---------------------------------------------------------------------------

/// Extract (lat, lon, alt) from one auxiliary feed message.
///
/// The feed carries JSON objects that may contain a nested position object
/// with numeric `latitude`/`longitude` fields (`altitude` optional). The
/// first such object wins. Any other shape (non-JSON, non-object, no
/// position) yields `None` without error.
pub fn parse_position_message(text: &str) -> Option<(f64, f64, f64)> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;
    for sub in obj.values() {
        if let Some(pos) = sub.as_object() {
            let lat = pos.get("latitude").and_then(serde_json::Value::as_f64);
            let lon = pos.get("longitude").and_then(serde_json::Value::as_f64);
            if let (Some(lat), Some(lon)) = (lat, lon) {
                let alt = pos
                    .get("altitude")
                    .and_then(serde_json::Value::as_f64)
                    .unwrap_or(0.0);
                return Some((lat, lon, alt));
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
