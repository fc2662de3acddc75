//! Decode package-type 0x01 payloads into telemetry records.
//!
//! Fixed field layout, all multi-byte values little-endian, offsets relative
//! to the payload start:
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0      | 64   | serial number (text, NUL-pad) |
//! | 64     | 64   | device type (text, NUL-pad)   |
//! | 128    | 1    | device subtype (not forwarded)|
//! | 129    | 8    | pilot latitude                |
//! | 137    | 8    | pilot longitude               |
//! | 145    | 8    | drone latitude                |
//! | 153    | 8    | drone longitude               |
//! | 161    | 8    | height above ground           |
//! | 169    | 8    | geodetic altitude             |
//! | 177    | 8    | home latitude                 |
//! | 185    | 8    | home longitude                |
//! | 193    | 8    | frequency                     |
//! | 201    | 8    | velocity east                 |
//! | 209    | 8    | velocity north                |
//! | 217    | 8    | velocity up                   |
//! | 225    | 2    | signal strength (signed)      |

use crate::frame::Frame;
use crate::types::{DroneIdError, Result, TelemetryRecord};

/// Minimum payload length for a complete record.
pub const RECORD_LEN: usize = 227;

/// Decode one frame's payload into a `TelemetryRecord`.
///
/// Fails with `RecordDecode` when the frame is not package type 0x01 or the
/// payload is shorter than [`RECORD_LEN`]; never partial output. Malformed
/// text bytes are replaced with U+FFFD rather than aborting, so a record is
/// never lost purely to bad text encoding.
pub fn decode_record(frame: &Frame) -> Result<TelemetryRecord> {
    if !frame.is_drone_id() {
        return Err(DroneIdError::RecordDecode(format!(
            "unexpected package type 0x{:02X}",
            frame.package_type
        )));
    }

    let data = &frame.payload;
    if data.len() < RECORD_LEN {
        return Err(DroneIdError::RecordDecode(format!(
            "payload too short: {} bytes, need {RECORD_LEN}",
            data.len()
        )));
    }

    // data[128] is a one-byte device-subtype flag: consumed, not forwarded
    Ok(TelemetryRecord {
        serial_number: text_at(&data[0..64]),
        device_type: text_at(&data[64..128]),
        pilot_lat: f64_at(data, 129),
        pilot_lon: f64_at(data, 137),
        drone_lat: f64_at(data, 145),
        drone_lon: f64_at(data, 153),
        height_agl: f64_at(data, 161),
        geodetic_altitude: f64_at(data, 169),
        home_lat: f64_at(data, 177),
        home_lon: f64_at(data, 185),
        frequency: f64_at(data, 193),
        speed_east: f64_at(data, 201),
        speed_north: f64_at(data, 209),
        speed_up: f64_at(data, 217),
        rssi: i16::from_le_bytes([data[225], data[226]]),
    })
}

/// Lossy UTF-8 decode with trailing NUL padding stripped.
fn text_at(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

fn f64_at(data: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PACKAGE_TYPE_DRONE_ID;

    /// Reference little-endian encoder for building test payloads.
    struct PayloadBuilder {
        data: Vec<u8>,
    }

    impl PayloadBuilder {
        fn new() -> Self {
            PayloadBuilder {
                data: vec![0u8; RECORD_LEN],
            }
        }

        fn serial(mut self, s: &str) -> Self {
            self.data[0..64].fill(0);
            self.data[0..s.len()].copy_from_slice(s.as_bytes());
            self
        }

        fn serial_bytes(mut self, raw: &[u8]) -> Self {
            self.data[0..64].fill(0);
            self.data[0..raw.len()].copy_from_slice(raw);
            self
        }

        fn device_type(mut self, s: &str) -> Self {
            self.data[64..128].fill(0);
            self.data[64..64 + s.len()].copy_from_slice(s.as_bytes());
            self
        }

        fn double(mut self, offset: usize, v: f64) -> Self {
            self.data[offset..offset + 8].copy_from_slice(&v.to_le_bytes());
            self
        }

        fn rssi(mut self, v: i16) -> Self {
            self.data[225..227].copy_from_slice(&v.to_le_bytes());
            self
        }

        fn build(self) -> Vec<u8> {
            self.data
        }
    }

    fn drone_id_frame(payload: Vec<u8>) -> Frame {
        Frame {
            package_type: PACKAGE_TYPE_DRONE_ID,
            payload,
        }
    }

    #[test]
    fn test_decode_round_trips_all_fields() {
        let payload = PayloadBuilder::new()
            .serial("DJI0123456789")
            .device_type("Mavic 3 Pro")
            .double(129, 37.71)
            .double(137, -122.41)
            .double(145, 37.72)
            .double(153, -122.42)
            .double(161, 80.5)
            .double(169, 120.25)
            .double(177, 37.70)
            .double(185, -122.40)
            .double(193, 2437.0)
            .double(201, 3.0)
            .double(209, 4.0)
            .double(217, 1.0)
            .rssi(-72)
            .build();

        let record = decode_record(&drone_id_frame(payload)).unwrap();
        assert_eq!(record.serial_number, "DJI0123456789");
        assert_eq!(record.device_type, "Mavic 3 Pro");
        assert_eq!(record.pilot_lat, 37.71);
        assert_eq!(record.pilot_lon, -122.41);
        assert_eq!(record.drone_lat, 37.72);
        assert_eq!(record.drone_lon, -122.42);
        assert_eq!(record.height_agl, 80.5);
        assert_eq!(record.geodetic_altitude, 120.25);
        assert_eq!(record.home_lat, 37.70);
        assert_eq!(record.home_lon, -122.40);
        assert_eq!(record.frequency, 2437.0);
        assert_eq!(record.speed_east, 3.0);
        assert_eq!(record.speed_north, 4.0);
        assert_eq!(record.speed_up, 1.0);
        assert_eq!(record.rssi, -72);
    }

    #[test]
    fn test_decode_bit_exact_doubles() {
        // Values with no short decimal representation survive bit-exact
        let lat = f64::from_bits(0x4042_DEAD_BEEF_CAFE);
        let payload = PayloadBuilder::new().double(145, lat).build();
        let record = decode_record(&drone_id_frame(payload)).unwrap();
        assert_eq!(record.drone_lat.to_bits(), lat.to_bits());
    }

    #[test]
    fn test_decode_short_payload() {
        for len in [0, 1, 128, 226] {
            let frame = drone_id_frame(vec![0u8; len]);
            assert!(
                matches!(decode_record(&frame), Err(DroneIdError::RecordDecode(_))),
                "payload of {len} bytes must not decode"
            );
        }
    }

    #[test]
    fn test_decode_wrong_package_type() {
        let frame = Frame {
            package_type: 0x02,
            payload: vec![0u8; RECORD_LEN],
        };
        assert!(matches!(
            decode_record(&frame),
            Err(DroneIdError::RecordDecode(_))
        ));
    }

    #[test]
    fn test_text_nul_padding_stripped() {
        let payload = PayloadBuilder::new().serial("ABC123").build();
        let record = decode_record(&drone_id_frame(payload)).unwrap();
        assert_eq!(record.serial_number, "ABC123");
        assert_eq!(record.device_type, "");
    }

    #[test]
    fn test_invalid_utf8_replaced_not_dropped() {
        let payload = PayloadBuilder::new()
            .serial_bytes(&[0xFF, 0xFE, b'X', b'Y', b'Z'])
            .build();
        let record = decode_record(&drone_id_frame(payload)).unwrap();
        assert!(record.serial_number.contains('\u{FFFD}'));
        assert!(record.serial_number.ends_with("XYZ"));
    }

    #[test]
    fn test_subtype_byte_not_forwarded() {
        let mut payload = PayloadBuilder::new().build();
        payload[128] = 0xFF;
        let record = decode_record(&drone_id_frame(payload.clone())).unwrap();
        payload[128] = 0x00;
        let record2 = decode_record(&drone_id_frame(payload)).unwrap();
        assert_eq!(record, record2);
    }

    #[test]
    fn test_negative_rssi_little_endian() {
        let payload = PayloadBuilder::new().rssi(-1).build();
        let record = decode_record(&drone_id_frame(payload)).unwrap();
        assert_eq!(record.rssi, -1);
    }

    #[test]
    fn test_oversized_payload_decodes_prefix() {
        let mut payload = PayloadBuilder::new().serial("OVERSIZE01").build();
        payload.extend_from_slice(&[0xEE; 16]);
        let record = decode_record(&drone_id_frame(payload)).unwrap();
        assert_eq!(record.serial_number, "OVERSIZE01");
    }
}
