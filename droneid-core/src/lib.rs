//! droneid-core: Pure decode + validation + formatting library for DJI
//! DroneID telemetry.
//!
//! No sockets, no clocks — just algorithms. This crate is the shared core
//! used by the `droneid-receiver` daemon: frame segmentation, record
//! decoding, the validation/fallback policy, the auxiliary-position cache,
//! and the JSON/CoT renderings.

pub mod config;
pub mod decode;
pub mod format;
pub mod frame;
pub mod sensor;
pub mod types;
pub mod validate;

// Re-export commonly used types at crate root
pub use decode::{decode_record, RECORD_LEN};
pub use frame::{Frame, FrameReader, PACKAGE_TYPE_DRONE_ID};
pub use sensor::{AuxPositionCache, AuxiliaryPosition};
pub use types::*;
pub use validate::{ValidationLimits, ALERT_SERIAL};
