//! Render a display record into the two published representations:
//! the ZMQ JSON message list and the CoT XML event.

use std::io::Cursor;

use chrono::{DateTime, Duration, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde_json::{json, Value};

use crate::types::{is_valid_latlon, DisplayRecord, PositionSource, Result};

/// Identifier type label for the Basic ID message.
pub const ID_TYPE_SERIAL: &str = "Serial Number (ANSI/CTA-2063-A)";

/// Description/callsign fallback when the device type is empty.
pub const DEFAULT_DESCRIPTION: &str = "DJI Drone";
pub const DEFAULT_CALLSIGN: &str = "Drone";

/// Appended to the Self-ID text when the position came from the host sensor.
pub const AUX_POSITION_SUFFIX: &str = " [sensor position]";

/// CoT events are authoritative for exactly this window after `start`.
pub const COT_STALE_SECS: i64 = 75;

// ---------------------------------------------------------------------------
// JSON message list
// ---------------------------------------------------------------------------

/// Build the ordered JSON message list for one record.
///
/// Always emitted in this order: Basic ID, Location/Vector, Self-ID, System
/// (only when pilot and/or home position is valid), Frequency.
pub fn json_messages(rec: &DisplayRecord) -> Vec<Value> {
    let description = if rec.device_type.is_empty() {
        DEFAULT_DESCRIPTION
    } else {
        rec.device_type.as_str()
    };

    let mut messages = vec![
        json!({
            "Basic ID": {
                "id_type": ID_TYPE_SERIAL,
                "id": rec.serial_number,
                "description": description,
                "RSSI": rec.rssi,
            }
        }),
        json!({
            "Location/Vector Message": {
                "latitude": rec.drone_lat,
                "longitude": rec.drone_lon,
                "geodetic_altitude": rec.geodetic_altitude,
                "height_agl": rec.height_agl,
                "speed": rec.horizontal_speed,
                "vert_speed": rec.speed_up,
            }
        }),
        json!({
            "Self-ID Message": {
                "text": self_id_text(rec),
            }
        }),
    ];

    let has_valid_pilot = is_valid_latlon(rec.pilot_lat, rec.pilot_lon);
    let has_valid_home = is_valid_latlon(rec.home_lat, rec.home_lon);
    if has_valid_pilot || has_valid_home {
        let mut system = serde_json::Map::new();
        if has_valid_pilot {
            system.insert("latitude".into(), json!(rec.pilot_lat));
            system.insert("longitude".into(), json!(rec.pilot_lon));
        }
        if has_valid_home {
            system.insert("home_lat".into(), json!(rec.home_lat));
            system.insert("home_lon".into(), json!(rec.home_lon));
        }
        messages.push(json!({ "System Message": system }));
    }

    messages.push(json!({
        "Frequency Message": {
            "frequency": rec.frequency,
        }
    }));

    messages
}

fn self_id_text(rec: &DisplayRecord) -> String {
    let base = if rec.device_type.is_empty() {
        DEFAULT_DESCRIPTION
    } else {
        rec.device_type.as_str()
    };
    if rec.position_source == PositionSource::Auxiliary {
        format!("{base}{AUX_POSITION_SUFFIX}")
    } else {
        base.to_string()
    }
}

// ---------------------------------------------------------------------------
// CoT event
// ---------------------------------------------------------------------------

/// Render one record as a Cursor-on-Target event.
///
/// `now` is injected so the validity window (start, stale = start + 75 s)
/// is deterministic under test.
pub fn cot_event(rec: &DisplayRecord, now: DateTime<Utc>) -> Result<String> {
    let time = cot_timestamp(now);
    let stale = cot_timestamp(now + Duration::seconds(COT_STALE_SECS));
    let uid = format!("{}-Drone", rec.serial_number);
    let lat = rec.drone_lat.to_string();
    let lon = rec.drone_lon.to_string();
    let speed = format!("{:.2}", rec.horizontal_speed);

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let mut event = BytesStart::new("event");
    event.push_attribute(("version", "2.0"));
    event.push_attribute(("uid", uid.as_str()));
    event.push_attribute(("type", "a-f-G-U-C"));
    event.push_attribute(("time", time.as_str()));
    event.push_attribute(("start", time.as_str()));
    event.push_attribute(("stale", stale.as_str()));
    event.push_attribute(("how", "m-g"));
    writer.write_event(Event::Start(event))?;

    // Conventional sentinels for unmeasured height/error
    let mut point = BytesStart::new("point");
    point.push_attribute(("lat", lat.as_str()));
    point.push_attribute(("lon", lon.as_str()));
    point.push_attribute(("hae", "999999"));
    point.push_attribute(("ce", "35.0"));
    point.push_attribute(("le", "999999"));
    writer.write_event(Event::Empty(point))?;

    writer.write_event(Event::Start(BytesStart::new("detail")))?;

    let mut contact = BytesStart::new("contact");
    contact.push_attribute(("callsign", callsign(&rec.device_type).as_str()));
    writer.write_event(Event::Empty(contact))?;

    let mut droid = BytesStart::new("uid");
    droid.push_attribute(("Droid", rec.serial_number.as_str()));
    writer.write_event(Event::Empty(droid))?;

    let mut group = BytesStart::new("__group");
    group.push_attribute(("name", "Yellow"));
    group.push_attribute(("role", "Team Member"));
    writer.write_event(Event::Empty(group))?;

    let mut precision = BytesStart::new("precisionlocation");
    precision.push_attribute(("geopointsrc", "GPS"));
    precision.push_attribute(("altsrc", "GPS"));
    writer.write_event(Event::Empty(precision))?;

    let mut track = BytesStart::new("track");
    track.push_attribute(("speed", speed.as_str()));
    writer.write_event(Event::Empty(track))?;

    writer.write_event(Event::End(BytesEnd::new("detail")))?;
    writer.write_event(Event::End(BytesEnd::new("event")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn cot_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Callsign from the device type: spaces become underscores, empty falls
/// back to the fixed default.
fn callsign(device_type: &str) -> String {
    if device_type.is_empty() {
        DEFAULT_CALLSIGN.to_string()
    } else {
        device_type.replace(' ', "_")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
