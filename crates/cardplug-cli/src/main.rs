//! cardplug controller binary.
//!
//! # Usage
//!
//! ```bash
//! # Run with the configuration file
//! cardplug --config /etc/cardplug/cardplug.toml
//!
//! # Verbose logging (RUST_LOG takes precedence when set)
//! cardplug --config cardplug.toml --log-level debug
//! ```
//!
//! The process runs until SIGINT or SIGTERM. Reader, outlet and indicator
//! are released on every exit path.

mod devices;

use anyhow::{Context, Result};
use cardplug_access::{AccessController, OutletController, ScanLoop};
use cardplug_core::Config;
use cardplug_hardware::{IndicatorDevice, OutletDevice};
use cardplug_storage::{CsvAuditLog, FileWhitelistStore, WhitelistStore};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// RFID-gated power outlet controller
#[derive(Parser, Debug)]
#[command(name = "cardplug")]
#[command(about = "Switch a power outlet for whitelisted RFID cards")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "cardplug.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    info!(version = cardplug_core::VERSION, "cardplug starting");

    let config = Config::load(&args.config)
        .with_context(|| format!("invalid configuration {}", args.config.display()))?;
    info!(
        config = %args.config.display(),
        masters = config.access.master_cards.len(),
        whitelist = %config.access.whitelist_path.display(),
        "Configuration loaded"
    );

    let store = FileWhitelistStore::new(&config.access.whitelist_path);
    let whitelist = store.load().await;
    info!(cards = whitelist.len(), "Whitelist ready");

    let mut indicator = devices::indicator(&config.indicator).await;

    let mut outlet = match devices::outlet(&config.outlet) {
        Ok(outlet) => outlet,
        Err(e) => {
            close_quietly(indicator.close().await, "indicator");
            return Err(e);
        }
    };

    let reader = match devices::reader(&config.reader).await {
        Ok(reader) => reader,
        Err(e) => {
            close_quietly(outlet.close().await, "outlet");
            close_quietly(indicator.close().await, "indicator");
            return Err(e);
        }
    };

    let mut controller = AccessController::new(
        OutletController::new(outlet, config.outlet.timeout),
        indicator,
        store,
        config.access.master_cards.clone(),
        whitelist,
        config.outlet.on_time,
    );
    if let Some(path) = &config.access.audit_log_path {
        info!(path = %path.display(), "Audit log enabled");
        controller = controller.with_audit_log(CsvAuditLog::new(path));
    }

    let mut scan = ScanLoop::new(reader, controller, &config.scan);
    scan.run(shutdown_signal()).await;
    scan.close().await;

    info!("cardplug stopped");
    Ok(())
}

fn close_quietly(result: cardplug_hardware::Result<()>, device: &str) {
    if let Err(e) = result {
        warn!(device, error = %e, "Failed to release device");
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
