//! droneid-receiver: edge daemon for AntSDR DJI DroneID ingest.
//!
//! Connects to the AntSDR TCP stream, decodes DroneID records, applies the
//! validation/fallback policy (consulting the host sensor's GPS fix), and
//! republishes each record as a ZMQ JSON message set and a CoT XML event
//! over unicast or multicast UDP. Runs unattended: no data-quality or
//! transient-network fault is fatal.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use droneid_core::config::{self, Config};
use droneid_core::sensor::AuxPositionCache;
use droneid_core::Result;

mod gps;
mod pipeline;
mod publish;
mod stream;

use publish::{CotDestination, CotPublisher, JsonPublisher, Publishers};

#[derive(Parser)]
#[command(
    name = "droneid-receiver",
    version,
    about = "DJI DroneID receiver: ZMQ JSON + CoT UDP bridge"
)]
struct Cli {
    /// Path to key=value configuration file
    #[arg(short, long, default_value = "config.txt")]
    config: PathBuf,

    /// Enable debug output to console
    #[arg(short, long)]
    debug: bool,

    /// Send CoT events via multicast instead of unicast
    #[arg(long)]
    multicast: bool,

    /// Multicast group address
    #[arg(long)]
    multicast_ip: Option<String>,

    /// Multicast port
    #[arg(long)]
    multicast_port: Option<u16>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let mut cfg = config::load_config(&cli.config);
    if cli.multicast {
        cfg.cot.multicast = true;
    }
    if let Some(ip) = cli.multicast_ip {
        cfg.cot.multicast_ip = ip;
    }
    if let Some(port) = cli.multicast_port {
        cfg.cot.multicast_port = port;
    }

    if let Err(e) = run(cfg) {
        log::error!("startup failed: {e}");
        std::process::exit(1);
    }
}

/// Wire up the sockets and hand the connection loop to the supervisor.
fn run(cfg: Config) -> Result<()> {
    let ctx = zmq::Context::new();
    let json = JsonPublisher::bind(&ctx, &cfg.publish)?;
    let cot = CotPublisher::new(CotDestination::from_config(&cfg.cot)?)?;
    let mut publishers = Publishers { json, cot };

    let mut gps_feed = gps::GpsFeed::connect(&ctx, &cfg.gps)?;
    let cache = AuxPositionCache::new();

    let backoff = Duration::from_secs(cfg.stream.reconnect_delay_secs);
    stream::supervise(
        || stream::connect(&cfg.stream),
        |sock| {
            pipeline::run(sock, &cache, &mut gps_feed, &mut publishers, &cfg.limits)
        },
        backoff,
        std::thread::sleep,
    );

    Ok(())
}
