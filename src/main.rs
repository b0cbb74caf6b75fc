//! eeghub - live hub for biosignal telemetry and offline capture analysis.
//!
//! Usage:
//!   eeghub serve --port 9090
//!   eeghub serve --config hub.json --frames 32 --events
//!   eeghub analyze eeg_data.bin --channels 32 --events

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use eeghub::config::HubConfig;
use eeghub::core::PacketGeometry;
use eeghub::engine::{analyze_capture, AnalysisOptions, AnalysisOutcome, HubRuntime};
use eeghub::hal::{CaptureFile, Framing};
use eeghub::observability::{ingest_report, sync_report, DEFAULT_GAP_REPORT_LIMIT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "eeghub")]
#[command(about = "Live hub and capture analysis for multichannel biosignal telemetry")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Accept a producer connection and keep its latest record
    Serve(ServeArgs),

    /// Sync-check and decode a capture file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    address: Option<String>,

    /// Ingest port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Expect binary packets with this many channels instead of text lines
    #[arg(long)]
    frames: Option<usize>,

    /// Extract event markers from binary packets
    #[arg(long)]
    events: bool,

    /// Seconds between status reports (0 = none)
    #[arg(long, default_value = "5")]
    report_interval: u64,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Capture file of back-to-back packets
    input: PathBuf,

    /// Channels per packet
    #[arg(long, default_value = "32")]
    channels: usize,

    /// Header bytes per packet (counter included)
    #[arg(long, default_value = "3")]
    header_bytes: usize,

    /// Extract event markers
    #[arg(long)]
    events: bool,

    /// Gap positions to list
    #[arg(long, default_value_t = DEFAULT_GAP_REPORT_LIMIT)]
    gap_limit: usize,

    /// Events to list
    #[arg(long, default_value = "10")]
    show_events: usize,

    /// Print the full analysis as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Analyze(args) => analyze(args),
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => HubConfig::load(path).context(format!("Failed to load config {:?}", path))?,
        None => HubConfig::default(),
    };
    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(channels) = args.frames {
        let geometry = PacketGeometry::new(3, channels)?;
        config.framing = Framing::Frames {
            geometry,
            extract_events: args.events,
        };
    }

    info!("eeghub v{}", env!("CARGO_PKG_VERSION"));

    let mut runtime = HubRuntime::new(config);
    runtime.start().await?;

    if let Some(addr) = runtime.local_addr() {
        info!("Listening for producers on {}. Press Ctrl+C to stop.", addr);
    }

    let hub = runtime.hub();
    let metrics = runtime.metrics();
    let report_every = Duration::from_secs(args.report_interval);

    if report_every.is_zero() {
        tokio::signal::ctrl_c().await?;
    } else {
        let mut ticker = tokio::time::interval(report_every);
        ticker.tick().await;
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result?;
                    break;
                }
                _ = ticker.tick() => {
                    let snapshot = hub.snapshot();
                    info!(sequence = snapshot.sequence(), "latest: {:.120}", hub.snapshot_text());
                    info!("\n{}", ingest_report(&metrics.snapshot()));
                }
            }
        }
    }

    info!("Shutting down");
    runtime.shutdown().await?;
    info!("\n{}", ingest_report(&metrics.snapshot()));

    Ok(())
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let geometry = PacketGeometry::new(args.header_bytes, args.channels)?;
    let capture = CaptureFile::open(&args.input)?;

    let options = AnalysisOptions {
        geometry,
        extract_events: args.events,
        gap_report_limit: args.gap_limit,
    };

    let analysis = match analyze_capture(capture.as_bytes(), options)? {
        AnalysisOutcome::Empty { discarded_bytes } => {
            println!(
                "{}: no complete {}-byte packet ({} bytes discarded)",
                capture.path().display(),
                geometry.packet_size(),
                discarded_bytes
            );
            return Ok(());
        }
        AnalysisOutcome::Analyzed(analysis) => analysis,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "Read {} packets of {} bytes ({} trailing bytes discarded)",
        analysis.frame_count(),
        geometry.packet_size(),
        analysis.discarded_bytes
    );
    print!("{}", sync_report(&analysis.sync));
    println!(
        "Decoded shape: {} x {}",
        analysis.frame_count(),
        geometry.channel_count
    );

    if args.events {
        let shown: Vec<String> = analysis
            .events
            .iter()
            .take(args.show_events)
            .map(|e| format!("(frame {}, ch {}, code {})", e.frame_index, e.channel, e.code))
            .collect();
        println!(
            "Detected events: {} (first {}) -> [{}]",
            analysis.events.len(),
            shown.len(),
            shown.join(", ")
        );
    }

    Ok(())
}
