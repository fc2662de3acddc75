//! Primary-stream transport and the reconnect supervisor.
//!
//! The supervisor owns the retry policy: connect, run the pipeline until
//! the stream ends, sleep a fixed backoff, reconnect, forever. Connect and
//! sleep are injected so tests script failures and successes without real
//! timing delays.

use std::io;
use std::net::TcpStream;
use std::time::Duration;

use droneid_core::config::StreamConfig;

use crate::pipeline::RunOutcome;

/// Open the TCP connection to the AntSDR.
pub fn connect(cfg: &StreamConfig) -> io::Result<TcpStream> {
    let addr = format!("{}:{}", cfg.server_ip, cfg.server_port);
    let stream = TcpStream::connect(&addr)?;
    log::info!("connected to AntSDR at {addr}");
    Ok(stream)
}

/// Unbounded-retry supervisory loop with fixed backoff.
///
/// Each cycle: `connect` produces a transport, `run` drives it until the
/// stream ends. Connect failures and disconnections both wait `backoff`
/// before the next attempt. Returns only when `run` reports `Shutdown`.
pub fn supervise<T, C, R, S>(mut connect: C, mut run: R, backoff: Duration, sleep: S)
where
    C: FnMut() -> io::Result<T>,
    R: FnMut(T) -> RunOutcome,
    S: Fn(Duration),
{
    loop {
        match connect() {
            Ok(transport) => match run(transport) {
                RunOutcome::Shutdown => return,
                RunOutcome::Disconnected => {
                    log::warn!("stream disconnected, reconnecting in {backoff:?}");
                }
            },
            Err(e) => {
                log::error!("connection failed: {e}, retrying in {backoff:?}");
            }
        }
        sleep(backoff);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
