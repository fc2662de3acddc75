//! Shared types, error enum, and coordinate helpers for droneid-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by droneid-core and the receiver daemon.
#[derive(Debug, Error)]
pub enum DroneIdError {
    #[error("malformed frame: {0}")]
    FrameParse(String),
    #[error("record decode failed: {0}")]
    RecordDecode(String),
    #[error("stream closed by peer")]
    ConnectionClosed,
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for DroneIdError {
    fn from(e: quick_xml::Error) -> Self {
        DroneIdError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, DroneIdError>;

// ---------------------------------------------------------------------------
// Coordinate validity
// ---------------------------------------------------------------------------

/// True if latitude/longitude are inside the standard ranges.
///
/// Range check only; (0, 0) passes. Used when deciding whether to zero a
/// field. `is_valid_latlon` is the stricter predicate used when deciding
/// whether a position is plottable.
pub fn in_range_latlon(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// True if latitude/longitude are in range and not simultaneously zero.
///
/// (0, 0) is the fallback value for an absent position and is never treated
/// as a real location. Applied identically to pilot, home, drone, and
/// auxiliary positions.
pub fn is_valid_latlon(lat: f64, lon: f64) -> bool {
    in_range_latlon(lat, lon) && !(lat == 0.0 && lon == 0.0)
}

// ---------------------------------------------------------------------------
// Telemetry record (wire mirror)
// ---------------------------------------------------------------------------

/// One decoded DroneID record, exactly as received.
///
/// No validity is enforced here: fields mirror the wire bytes even when
/// physically nonsensical. Validity is assigned by `validate::apply`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub serial_number: String,
    pub device_type: String,
    pub pilot_lat: f64,
    pub pilot_lon: f64,
    pub drone_lat: f64,
    pub drone_lon: f64,
    /// Height above ground, meters.
    pub height_agl: f64,
    /// Geodetic altitude, meters.
    pub geodetic_altitude: f64,
    pub home_lat: f64,
    pub home_lon: f64,
    /// Carrier frequency as reported upstream. Units are not
    /// self-describing; passed through opaque.
    pub frequency: f64,
    /// Velocity components, m/s.
    pub speed_east: f64,
    pub speed_north: f64,
    pub speed_up: f64,
    /// Received signal strength.
    pub rssi: i16,
}

// ---------------------------------------------------------------------------
// Display record (validated/fallback-applied)
// ---------------------------------------------------------------------------

/// Where the published drone position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionSource {
    /// The record's own position was valid.
    Own,
    /// Substituted from the host sensor's GPS fix.
    Auxiliary,
    /// Neither was usable; the position must not be plotted.
    None,
}

/// The record actually published, after validation and fallback.
///
/// A `PositionSource::None` record still carries resolvable drone
/// coordinates; consumers must treat them as "do not plot".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub serial_number: String,
    pub device_type: String,
    pub pilot_lat: f64,
    pub pilot_lon: f64,
    pub drone_lat: f64,
    pub drone_lon: f64,
    pub height_agl: f64,
    pub geodetic_altitude: f64,
    pub home_lat: f64,
    pub home_lon: f64,
    pub frequency: f64,
    pub speed_east: f64,
    pub speed_north: f64,
    pub speed_up: f64,
    pub rssi: i16,
    /// Euclidean norm of the east/north velocity components, m/s.
    pub horizontal_speed: f64,
    pub position_source: PositionSource,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
