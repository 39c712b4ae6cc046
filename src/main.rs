//! Study-material forwarding proxy.
//!
//! ```text
//!     Client / platform        ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http server ─▶ platform adapter ─▶ forwarder ┼──▶ Backend
//!                              │   (axum)        (raw | envelope)    (hyper)    │    origin
//!     ◀────────────────────────┼── http server ◀─ platform adapter ◀─ forwarder ◀┼───
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use study_proxy::config::load_config;
use study_proxy::observability::{logging, metrics};
use study_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "study-proxy")]
#[command(about = "Forwarding proxy for the study-material backend", long_about = None)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("study-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        platform = %config.host_platform(),
        mount_prefix = %config.mount_prefix(),
        origin = %config.backend_origin(),
        upstream_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
