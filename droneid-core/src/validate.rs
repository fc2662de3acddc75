//! Validation and fallback policy: `TelemetryRecord` → `DisplayRecord`.
//!
//! Pure function of the record plus the current auxiliary-position snapshot.
//! Out-of-range coordinates and implausible speeds are expected input noise,
//! not errors: the engine always produces a record and never fails.

use crate::sensor::AuxiliaryPosition;
use crate::types::{
    in_range_latlon, is_valid_latlon, DisplayRecord, PositionSource, TelemetryRecord,
};

/// Published in place of an unknown or substituted serial number.
pub const ALERT_SERIAL: &str = "9999999999";

/// Horizontal speeds above this are treated as sensor/decoding artifacts.
pub const DEFAULT_MAX_HORIZONTAL_SPEED: f64 = 200.0; // m/s

/// Serial numbers with fewer visible characters are treated as unknown.
pub const DEFAULT_MIN_SERIAL_LEN: usize = 5;

/// Tunable validation thresholds (config surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationLimits {
    pub max_horizontal_speed: f64,
    pub min_serial_len: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            max_horizontal_speed: DEFAULT_MAX_HORIZONTAL_SPEED,
            min_serial_len: DEFAULT_MIN_SERIAL_LEN,
        }
    }
}

/// Apply the validation/fallback rules, in order:
///
/// 1. Serial with fewer than `min_serial_len` visible characters → alert
///    sentinel.
/// 2. Pilot position out of range → both coordinates zeroed.
/// 3. Home position, same rule.
/// 4. Drone position range-checked but not zeroed; resolved next.
/// 5. Drone position valid and non-zero → `Own`. Else a valid non-zero
///    auxiliary fix → substituted, `Auxiliary`, and the serial is forced to
///    the sentinel so the substitution is visible downstream. Else `None`
///    and the decoded coordinates pass through untouched.
/// 6. Horizontal speed = √(e² + n²); reset to exactly 0 when it exceeds
///    `max_horizontal_speed`. Vertical speed is never altered.
pub fn apply(
    record: &TelemetryRecord,
    aux: Option<&AuxiliaryPosition>,
    limits: &ValidationLimits,
) -> DisplayRecord {
    let mut serial_number = if record.serial_number.trim().chars().count() < limits.min_serial_len
    {
        log::debug!("serial number blank or too short, using alert sentinel");
        ALERT_SERIAL.to_string()
    } else {
        record.serial_number.clone()
    };

    let (pilot_lat, pilot_lon) = if in_range_latlon(record.pilot_lat, record.pilot_lon) {
        (record.pilot_lat, record.pilot_lon)
    } else {
        log::debug!(
            "pilot position ({}, {}) out of range, zeroing",
            record.pilot_lat,
            record.pilot_lon
        );
        (0.0, 0.0)
    };

    let (home_lat, home_lon) = if in_range_latlon(record.home_lat, record.home_lon) {
        (record.home_lat, record.home_lon)
    } else {
        log::debug!(
            "home position ({}, {}) out of range, zeroing",
            record.home_lat,
            record.home_lon
        );
        (0.0, 0.0)
    };

    let (drone_lat, drone_lon, position_source) =
        if is_valid_latlon(record.drone_lat, record.drone_lon) {
            (record.drone_lat, record.drone_lon, PositionSource::Own)
        } else {
            match aux.filter(|a| is_valid_latlon(a.lat, a.lon)) {
                Some(a) => {
                    log::debug!(
                        "drone position ({}, {}) invalid, substituting sensor fix ({}, {})",
                        record.drone_lat,
                        record.drone_lon,
                        a.lat,
                        a.lon
                    );
                    serial_number = ALERT_SERIAL.to_string();
                    (a.lat, a.lon, PositionSource::Auxiliary)
                }
                None => (record.drone_lat, record.drone_lon, PositionSource::None),
            }
        };

    let mut horizontal_speed =
        (record.speed_east * record.speed_east + record.speed_north * record.speed_north).sqrt();
    if horizontal_speed > limits.max_horizontal_speed {
        log::debug!(
            "horizontal speed {horizontal_speed:.1} m/s above {:.1}, resetting to 0",
            limits.max_horizontal_speed
        );
        horizontal_speed = 0.0;
    }

    DisplayRecord {
        serial_number,
        device_type: record.device_type.clone(),
        pilot_lat,
        pilot_lon,
        drone_lat,
        drone_lon,
        height_agl: record.height_agl,
        geodetic_altitude: record.geodetic_altitude,
        home_lat,
        home_lon,
        frequency: record.frequency,
        speed_east: record.speed_east,
        speed_north: record.speed_north,
        speed_up: record.speed_up,
        rssi: record.rssi,
        horizontal_speed,
        position_source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> TelemetryRecord {
        TelemetryRecord {
            serial_number: "DJI0123456789".into(),
            device_type: "Mavic 3".into(),
            pilot_lat: 37.71,
            pilot_lon: -122.41,
            drone_lat: 37.72,
            drone_lon: -122.42,
            height_agl: 80.0,
            geodetic_altitude: 120.0,
            home_lat: 37.70,
            home_lon: -122.40,
            frequency: 2437.0,
            speed_east: 3.0,
            speed_north: 4.0,
            speed_up: 1.0,
            rssi: -70,
        }
    }

    fn aux_fix(lat: f64, lon: f64) -> AuxiliaryPosition {
        AuxiliaryPosition {
            lat,
            lon,
            alt: 10.0,
            observed_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_clean_record_passes_through() {
        let out = apply(&record(), None, &ValidationLimits::default());
        assert_eq!(out.serial_number, "DJI0123456789");
        assert_eq!(out.position_source, PositionSource::Own);
        assert_eq!(out.drone_lat, 37.72);
        assert_eq!(out.horizontal_speed, 5.0);
        assert_eq!(out.speed_up, 1.0);
    }

    #[test]
    fn test_short_serial_replaced() {
        let mut rec = record();
        rec.serial_number = "AB12".into();
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!(out.serial_number, ALERT_SERIAL);
    }

    #[test]
    fn test_whitespace_serial_replaced() {
        // 10 spaces trims to zero visible characters
        let mut rec = record();
        rec.serial_number = "          ".into();
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!(out.serial_number, ALERT_SERIAL);
    }

    #[test]
    fn test_pilot_out_of_range_zeroed() {
        let mut rec = record();
        rec.pilot_lat = 91.0;
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!((out.pilot_lat, out.pilot_lon), (0.0, 0.0));
        // Home untouched
        assert_eq!(out.home_lat, 37.70);
    }

    #[test]
    fn test_home_out_of_range_zeroed() {
        let mut rec = record();
        rec.home_lon = -200.0;
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!((out.home_lat, out.home_lon), (0.0, 0.0));
        assert_eq!(out.pilot_lat, 37.71);
    }

    #[test]
    fn test_invalid_drone_position_with_aux_substitutes() {
        let mut rec = record();
        rec.drone_lat = 500.0;
        let fix = aux_fix(37.7, -122.4);
        let out = apply(&rec, Some(&fix), &ValidationLimits::default());
        assert_eq!(out.position_source, PositionSource::Auxiliary);
        assert_eq!((out.drone_lat, out.drone_lon), (37.7, -122.4));
        // Substitution is made visible even though the serial was fine
        assert_eq!(out.serial_number, ALERT_SERIAL);
    }

    #[test]
    fn test_zero_drone_position_counts_as_invalid() {
        let mut rec = record();
        rec.drone_lat = 0.0;
        rec.drone_lon = 0.0;
        let fix = aux_fix(37.7, -122.4);
        let out = apply(&rec, Some(&fix), &ValidationLimits::default());
        assert_eq!(out.position_source, PositionSource::Auxiliary);
    }

    #[test]
    fn test_invalid_drone_position_without_aux() {
        let mut rec = record();
        rec.drone_lat = 500.0;
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!(out.position_source, PositionSource::None);
        // Decoded values pass through untouched
        assert_eq!(out.drone_lat, 500.0);
        assert_eq!(out.drone_lon, -122.42);
        assert_eq!(out.serial_number, "DJI0123456789");
    }

    #[test]
    fn test_zeroed_aux_fix_is_not_substituted() {
        let mut rec = record();
        rec.drone_lat = 500.0;
        let fix = aux_fix(0.0, 0.0);
        let out = apply(&rec, Some(&fix), &ValidationLimits::default());
        assert_eq!(out.position_source, PositionSource::None);
    }

    #[test]
    fn test_excessive_speed_reset_to_zero() {
        let mut rec = record();
        rec.speed_east = 180.0;
        rec.speed_north = 180.0; // norm ≈ 254.6
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!(out.horizontal_speed, 0.0);
        // Never clamped, never applied to vertical speed
        assert_eq!(out.speed_up, 1.0);
    }

    #[test]
    fn test_speed_at_limit_not_reset() {
        let mut rec = record();
        rec.speed_east = 200.0;
        rec.speed_north = 0.0;
        let out = apply(&rec, None, &ValidationLimits::default());
        assert_eq!(out.horizontal_speed, 200.0);
    }

    #[test]
    fn test_custom_limits() {
        let limits = ValidationLimits {
            max_horizontal_speed: 4.0,
            min_serial_len: 20,
        };
        let out = apply(&record(), None, &limits);
        assert_eq!(out.horizontal_speed, 0.0); // 5.0 > 4.0
        assert_eq!(out.serial_number, ALERT_SERIAL); // 13 chars < 20
    }
}
