//! simulate-device - stand-in acquisition client.
//!
//! Streams text lines or binary packets to a running hub, reconnecting
//! whenever the hub goes away, or writes a capture file.
//!
//! Usage:
//!   simulate-device --port 9090
//!   simulate-device --mode frames --channels 32 --event-every 250
//!   simulate-device --write-capture eeg_data.bin --count 5000 --drop-every 1000

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use eeghub::core::PacketGeometry;
use eeghub::hal::mock::{EventInjection, SimulatedDevice, SimulatedDeviceConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// CSV text lines
    Lines,
    /// Binary packets
    Frames,
}

#[derive(Parser, Debug)]
#[command(name = "simulate-device")]
#[command(about = "Simulated multichannel acquisition client")]
#[command(version)]
struct Args {
    /// Hub address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Hub ingest port
    #[arg(short, long, default_value = "9090")]
    port: u16,

    #[arg(long, value_enum, default_value = "lines")]
    mode: Mode,

    /// Channels per packet / line round
    #[arg(long, default_value = "8")]
    channels: usize,

    /// Samples per channel in each text line
    #[arg(long, default_value = "1000")]
    samples_per_line: usize,

    /// Delay between sends (ms)
    #[arg(long, default_value = "50")]
    interval_ms: u64,

    /// Seconds between reconnect attempts
    #[arg(long, default_value = "2")]
    reconnect_secs: u64,

    /// Inject an event marker every N frames
    #[arg(long)]
    event_every: Option<u64>,

    /// Event code to inject
    #[arg(long, default_value = "5")]
    event_code: u8,

    /// Channel carrying injected events
    #[arg(long, default_value = "0")]
    event_channel: usize,

    /// Skip every N-th frame so the counter jumps
    #[arg(long)]
    drop_every: Option<u64>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write packets to this file instead of streaming
    #[arg(long)]
    write_capture: Option<PathBuf>,

    /// Packets to write with --write-capture
    #[arg(long, default_value = "2500")]
    count: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

async fn connect(addr: &str, retry: Duration) -> TcpStream {
    loop {
        info!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Connected to hub");
                return stream;
            }
            Err(e) => {
                warn!(error = %e, "connection failed, retrying in {:?}", retry);
                tokio::time::sleep(retry).await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .init();

    let geometry = PacketGeometry::new(3, args.channels)?;
    let mut device = SimulatedDevice::new(SimulatedDeviceConfig {
        geometry,
        event: args.event_every.map(|every| EventInjection {
            channel: args.event_channel,
            code: args.event_code,
            every,
        }),
        drop_every: args.drop_every,
        seed: args.seed,
        ..Default::default()
    });

    if let Some(path) = &args.write_capture {
        let bytes = device.capture(args.count)?;
        std::fs::write(path, &bytes).context(format!("Failed to write capture {:?}", path))?;
        info!("Wrote {} packets ({} bytes) to {}", args.count, bytes.len(), path.display());
        return Ok(());
    }

    let addr = format!("{}:{}", args.host, args.port);
    let retry = Duration::from_secs(args.reconnect_secs);
    let interval = Duration::from_millis(args.interval_ms);
    let mut stream: Option<TcpStream> = None;

    loop {
        if stream.is_none() {
            stream = Some(connect(&addr, retry).await);
        }
        let Some(conn) = stream.as_mut() else {
            continue;
        };

        let payload = match args.mode {
            Mode::Lines => device.next_line(args.samples_per_line).into_bytes(),
            Mode::Frames => device.next_frame()?,
        };

        if let Err(e) = conn.write_all(&payload).await {
            warn!(error = %e, "hub disconnected, reconnecting");
            stream = None;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("Stopped");
    Ok(())
}
