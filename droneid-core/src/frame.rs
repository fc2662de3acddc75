//! Segment the inbound AntSDR byte stream into length-prefixed frames.
//!
//! Responsibilities:
//! - Read the 5-byte header: 2-byte marker (opaque), 1-byte package type,
//!   u16 little-endian total frame length including the header
//! - Extract the payload (declared length minus the header)
//! - Distinguish a truncated frame (dropped, stream continues) from a closed
//!   stream (sequence ends, caller reconnects)

use std::io::{self, Read};

use crate::types::{DroneIdError, Result};

/// Header size: marker (2) + package type (1) + length (2).
pub const FRAME_HEADER_LEN: usize = 5;

/// Package type carrying a DroneID telemetry record.
pub const PACKAGE_TYPE_DRONE_ID: u8 = 0x01;

/// One segmented frame. The marker bytes are consumed and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub package_type: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// True if this frame carries a DroneID record payload.
    pub fn is_drone_id(&self) -> bool {
        self.package_type == PACKAGE_TYPE_DRONE_ID
    }
}

/// Turns a continuous byte stream into a lazy sequence of frames.
pub struct FrameReader<R: Read> {
    inner: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        FrameReader { inner }
    }

    /// Read the next complete frame.
    ///
    /// Errors:
    /// - `FrameParse`: header unreadable or stream ended mid-frame. The
    ///   partial frame is discarded; the caller keeps reading.
    /// - `ConnectionClosed`: clean end of stream at a frame boundary. The
    ///   caller must trigger the reconnect policy.
    pub fn next_frame(&mut self) -> Result<Frame> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        read_full(&mut self.inner, &mut header)?;

        let package_type = header[2];
        let total_len = u16::from_le_bytes([header[3], header[4]]) as usize;
        if total_len < FRAME_HEADER_LEN {
            return Err(DroneIdError::FrameParse(format!(
                "declared length {total_len} shorter than {FRAME_HEADER_LEN}-byte header"
            )));
        }

        let mut payload = vec![0u8; total_len - FRAME_HEADER_LEN];
        match read_full(&mut self.inner, &mut payload) {
            Ok(()) => Ok(Frame {
                package_type,
                payload,
            }),
            // EOF inside a declared frame is a truncation, not a clean close
            Err(DroneIdError::ConnectionClosed) => Err(DroneIdError::FrameParse(format!(
                "stream ended mid-frame: wanted {} payload bytes",
                total_len - FRAME_HEADER_LEN
            ))),
            Err(e) => Err(e),
        }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    /// Yields frames and recoverable parse errors; ends on stream close or
    /// an I/O fault (the caller reconnects).
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(e @ DroneIdError::FrameParse(_)) => Some(Err(e)),
            Err(_) => None,
        }
    }
}

/// Fill `buf` completely.
///
/// A zero-length read before the first byte maps to `ConnectionClosed`;
/// after at least one byte, to `FrameParse` (partial unit on the wire).
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(if filled == 0 {
                    DroneIdError::ConnectionClosed
                } else {
                    DroneIdError::FrameParse(format!(
                        "stream ended after {filled} of {} bytes",
                        buf.len()
                    ))
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DroneIdError::Io(e)),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
