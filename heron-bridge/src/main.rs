//! Heron bridge - CAN bus distance sensors over a USB/CAN converter
//!
//! Polls the EDUCAT sensor nodes registered in `heron.toml` and logs their
//! corrected distances every period.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use heron_bridge::config::{load_config, Overrides};
use heron_bridge::tasks::{Bridge, BridgeSettings};
use heron_bridge::transport::{MockTransport, SerialTransport};
use heron_bridge::{Error, LogSink, Result, SensorManager};
use heron_hal::UartConfig;

#[derive(Parser)]
#[command(name = "heron-bridge")]
#[command(about = "Bridge between a USB/CAN converter and EDUCAT distance sensors")]
struct Cli {
    /// Path to the configuration file (embedded defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device of the converter
    #[arg(short, long)]
    port: Option<String>,

    /// Converter baud rate
    #[arg(short, long)]
    baudrate: Option<u32>,

    /// Poll and publish period in milliseconds
    #[arg(long)]
    period_ms: Option<u32>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Run against an in-memory link instead of the serial port
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    log::info!("Heron bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let overrides = Overrides {
        port: cli.port,
        baudrate: cli.baudrate,
        period_ms: cli.period_ms,
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    let manager = Arc::new(SensorManager::new(&config));
    let settings = BridgeSettings::from_config(&config);

    let bridge = if cli.dry_run {
        log::warn!("Dry run: no serial port opened, nodes will not answer");
        let link = MockTransport::new();
        Bridge::spawn(link.clone(), link, manager, LogSink::new(), settings)?
    } else {
        let uart = UartConfig::with_baudrate(config.converter.baudrate);
        let rx = SerialTransport::open(&config.converter.port, &uart)?;
        let tx = rx.try_clone()?;
        Bridge::spawn(rx, tx, manager, LogSink::new(), settings)?
    };

    let running = bridge.running();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        running.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!("Heron bridge running. Press Ctrl-C to stop.");
    while bridge.is_running() {
        thread::sleep(Duration::from_millis(100));
    }

    let result = bridge.join();
    match &result {
        Ok(()) => log::info!("Heron bridge stopped"),
        Err(e) => log::error!("Heron bridge failed: {}", e),
    }
    result
}
