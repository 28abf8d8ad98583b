//! hotspot-dash - live reward and status tracker for Helium hotspots.

use clap::Parser;
use hotspot_dash::config::{
    FailurePolicy, LoggingConfig, MetadataCadence, load_address_file, log_dir, resolve_addresses,
};
use hotspot_dash::{App, Config, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "hotspot-dash", version, about = "Track Helium hotspot rewards and status")]
struct Cli {
    /// Hotspot addresses to track (merged with the config file's list).
    addresses: Vec<String>,

    /// Path to config.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between polls of each metric.
    #[arg(short, long)]
    interval: Option<u64>,

    /// Fetch hotspot metadata only until it first succeeds.
    #[arg(long)]
    metadata_once: bool,

    /// Stop polling an address after any of its fetches fails.
    #[arg(long)]
    cancel_on_error: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.clone())?;
    if let Some(interval) = cli.interval {
        config.polling.interval_secs = interval;
    }
    if cli.metadata_once {
        config.polling.metadata_cadence = MetadataCadence::Once;
    }
    if cli.cancel_on_error {
        config.polling.failure_policy = FailurePolicy::CancelAddress;
    }

    // Keep the guard alive so the file writer flushes on exit.
    let _log_guard = init_logging(&config.logging)?;

    let mut sources = cli.addresses;
    sources.extend(config.addresses.iter().cloned());
    if let Some(path) = &config.address_file {
        sources.extend(load_address_file(path)?);
    }
    let addresses = resolve_addresses(sources)?;

    // Run the application
    let mut app = App::new(config, addresses)?;
    app.run().await?;

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = if logging.file_logging {
        let dir = log_dir()?;
        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::daily(dir, "hotspot-dash.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logging.filter.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
