//! Filter-chain API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────┐
//!                     │                 GATEWAY                        │
//!                     │                                                │
//!  Client Request     │  ┌────────┐   ┌─────────┐   ┌──────────────┐  │
//!  ───────────────────┼─▶│  http  │──▶│ routing │──▶│ filter chain │  │
//!                     │  │ server │   │ (table) │   │  pre-phase   │  │
//!                     │  └────────┘   └─────────┘   └──────┬───────┘  │
//!                     │                                    ▼          │
//!                     │                            ┌──────────────┐   │
//!                     │                            │  forwarder   │───┼──▶ Upstream
//!  Client Response    │  ┌──────────────┐          │ (proxy call) │   │
//!  ◀──────────────────┼──│ filter chain │◀─────────┴──────────────┘   │
//!                     │  │  post-phase  │  (reverse order)            │
//!                     │  └──────────────┘                             │
//!                     │                                                │
//!                     │  config / validation / reload · observability  │
//!                     └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use filter_gateway::config::loader::load_config;
use filter_gateway::config::watcher::ConfigWatcher;
use filter_gateway::config::GatewayConfig;
use filter_gateway::filter::registry::FilterRegistry;
use filter_gateway::lifecycle::Shutdown;
use filter_gateway::observability::{logging, metrics};
use filter_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "filter-gateway", about = "Filter-chain API gateway")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch the configuration file and hot-reload the route table.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args = Args::parse();
    let registry = Arc::new(FilterRegistry::builtin());

    let config = match &args.config {
        Some(path) => load_config(path, &registry)?,
        None => GatewayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        global_filters = config.global_filters.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Keep the watcher handle alive for the life of the server.
    let (config_updates, _watcher) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, registry.clone());
            (updates, Some(watcher.run()?))
        }
        _ => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config)?;
    server
        .run(listener, config_updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
