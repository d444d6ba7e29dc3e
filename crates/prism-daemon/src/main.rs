//! Prism Daemon - Main entry point
//!
//! Runs the device reconciler against a control surface and serves the
//! resolved devices over HTTP and WebSocket.

mod api;
mod config;
mod server;
mod state;
mod ws;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(about = "LED device topology resolution and addressing daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "prism.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Topology snapshot to replay instead of the configured one
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Resolve devices once, print them and exit
    #[arg(long)]
    scan_once: bool,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Prism v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }
    if let Some(snapshot) = args.snapshot {
        config.surface.snapshot_path = snapshot.display().to_string();
    }

    info!(
        snapshot = %config.surface.snapshot_path,
        interval_secs = config.daemon.reconcile_interval_secs,
        "Configuration loaded"
    );

    let state = state::AppState::new(config.clone());

    if args.scan_once {
        info!("Running single resolution");
        let devices = state.reconciler.get_devices().await?;
        println!("Resolved {} devices:", devices.len());
        for device in devices {
            println!(
                "  - {} ({:?}, {} LEDs, thumbnail {})",
                device.name,
                device.kind,
                device.leds.len(),
                device.thumbnail
            );
            if let Some(channel) = &device.connected_to {
                println!("    Connected to: {}", channel);
            }
            if let Some(spec) = &device.custom_spec {
                println!("    Spec: {} ({} LEDs)", spec.name, spec.led_count);
            }
        }
    } else {
        server::run(state, &config.daemon.bind).await?;
    }

    Ok(())
}
