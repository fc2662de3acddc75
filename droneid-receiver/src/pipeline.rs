//! One-connection run loop: drain the auxiliary feed, then read, decode,
//! validate, format, and publish frames sequentially.
//!
//! One record in yields one publish action out before the next frame is
//! read — no work queue, no parallel fan-out. Frame and record errors drop
//! the unit and continue; only a closed stream or I/O fault ends the loop,
//! handing control back to the reconnect supervisor.

use std::io::{BufReader, Read};

use chrono::Utc;

use droneid_core::format;
use droneid_core::sensor::AuxPositionCache;
use droneid_core::validate;
use droneid_core::{decode_record, DroneIdError, FrameReader, ValidationLimits};

/// Why the run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stream closed or faulted; the supervisor reconnects.
    Disconnected,
    /// A sink requested shutdown (used by tests and process teardown).
    Shutdown,
}

/// Source of auxiliary sensor fixes, polled once per loop iteration.
pub trait AuxSource {
    /// Drain pending feed messages into the cache without blocking the
    /// pipeline.
    fn poll(&mut self, cache: &AuxPositionCache);
}

/// Destination for one record's serialized renderings.
pub trait PublishSink {
    fn send_json(&mut self, body: &str);
    fn send_cot(&mut self, body: &str);
    /// Tests override this to stop the loop after a scripted number of
    /// records; the daemon always returns false.
    fn shutdown_requested(&self) -> bool {
        false
    }
}

/// Drive one connection until the stream ends.
pub fn run<R: Read>(
    stream: R,
    cache: &AuxPositionCache,
    aux: &mut dyn AuxSource,
    sink: &mut dyn PublishSink,
    limits: &ValidationLimits,
) -> RunOutcome {
    let mut frames = FrameReader::new(BufReader::new(stream));

    loop {
        if sink.shutdown_requested() {
            return RunOutcome::Shutdown;
        }

        aux.poll(cache);

        let frame = match frames.next_frame() {
            Ok(frame) => frame,
            Err(DroneIdError::FrameParse(msg)) => {
                log::warn!("dropping malformed frame: {msg}");
                continue;
            }
            Err(e) => {
                log::info!("stream ended: {e}");
                return RunOutcome::Disconnected;
            }
        };

        if !frame.is_drone_id() {
            log::debug!("skipping package type 0x{:02X}", frame.package_type);
            continue;
        }

        let record = match decode_record(&frame) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("dropping record: {e}");
                continue;
            }
        };

        let display = validate::apply(&record, cache.snapshot().as_ref(), limits);

        let messages = format::json_messages(&display);
        if messages.is_empty() {
            continue;
        }
        match serde_json::to_string(&messages) {
            Ok(body) => sink.send_json(&body),
            Err(e) => log::warn!("JSON serialization failed: {e}"),
        }

        match format::cot_event(&display, Utc::now()) {
            Ok(xml) => sink.send_cot(&xml),
            Err(e) => log::warn!("CoT serialization failed: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
