//! Service Status Aggregator (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                      STATUS AGGREGATOR                        │
//!   │                                                               │
//!   │  ┌───────────┐   every interval   ┌──────────────┐            │
//!   │  │ scheduler │───────────────────▶│ check_all    │            │
//!   │  └───────────┘                    │ (task/svc)   │──── GET ───┼──▶ /health
//!   │                                   └──────┬───────┘            │
//!   │                                          ▼                    │
//!   │                     ┌──────────────────────────────────┐      │
//!   │                     │ registry: state + uptime counters │      │
//!   │                     │ incident log                      │      │
//!   │                     └──────────────┬───────────────────┘      │
//!   │                                    ▼                          │
//!   │   Status page / LB  ◀──── http (summary, 200/503) ◀───────────┤
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;

use status_aggregator::config::{load_config, watcher::ConfigWatcher, AggregatorConfig};
use status_aggregator::lifecycle::shutdown_signal;
use status_aggregator::observability::{init_logging, metrics};
use status_aggregator::{Aggregator, StatusServer};

#[derive(Parser)]
#[command(name = "status-aggregator")]
#[command(about = "Polls backend health endpoints and serves a consolidated status report")]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "STATUS_AGGREGATOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AggregatorConfig::default(),
    };

    init_logging(&config.observability.log_level);
    tracing::info!("status-aggregator v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        interval_secs = config.checks.interval_secs,
        timeout_ms = config.checks.timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let aggregator = Aggregator::from_config(&config)?;
    aggregator.start();

    // Keep the watcher handle alive for the life of the process.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let reload_target = aggregator.clone();
            tokio::spawn(async move {
                while let Some(new_config) = updates.recv().await {
                    reload_target.reload(&new_config);
                }
            });
            match watcher.run() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!(error = %e, "Config watcher failed to start, hot reload disabled");
                    None
                }
            }
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = StatusServer::new(aggregator.clone(), config.http.clone());
    server.run(listener, shutdown_signal()).await?;

    aggregator.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
