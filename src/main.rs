//! Gateway entry point.
//!
//! Startup order: config → logging → metrics → staging dir → listener →
//! serve until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ocr_gateway::config;
use ocr_gateway::http::HttpServer;
use ocr_gateway::lifecycle::{signals, Shutdown};
use ocr_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "ocr-gateway")]
#[command(about = "Document-ingestion gateway relaying uploads to the OCR/NLP backend")]
struct Cli {
    /// Optional TOML config file; defaults apply without one.
    /// PORT and OCR_NLP_BASE environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        max_upload_bytes = config.limits.max_upload_bytes,
        staging = ?config.limits.staging,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    if let Some(dir) = &config.limits.staging_dir {
        std::fs::create_dir_all(dir)?;
        tracing::info!(staging_dir = %dir.display(), "Staging directory ready");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
