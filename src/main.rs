//! Webhook inspector server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Webhook sender ──▶ /{sessionId} ──▶ capture ──▶ store (SQLite)
//!                                                       ▲
//!     Dashboard poll ──▶ GET /{sessionId}?fetch_payloads=true (Accept: JSON)
//!
//!     Composer ──▶ /proxy ──▶ own endpoint? ── yes ──▶ store
//!                                  │
//!                                  no ──▶ outbound HTTP ──▶ envelope
//! ```
//!
//! Startup order: config, logging, metrics, store, listener, server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use webhook_inspector::config::{load_config, InspectorConfig};
use webhook_inspector::config::validation::validate_config;
use webhook_inspector::observability::{logging, metrics};
use webhook_inspector::{HttpServer, Shutdown, SqliteStore};

#[derive(Parser)]
#[command(name = "webhook-inspector")]
#[command(about = "Capture and inspect webhooks per session", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `storage.database_path`.
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => InspectorConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(database) = args.database {
        config.storage.database_path = database;
    }
    if let Err(errors) = validate_config(&config) {
        for e in &errors {
            eprintln!("invalid configuration: {e}");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "webhook-inspector starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database_path = %config.storage.database_path,
        request_timeout_secs = config.timeouts.request_secs,
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

    let store = Arc::new(SqliteStore::open(Path::new(&config.storage.database_path))?);
    tracing::info!(path = %config.storage.database_path, "Capture store ready");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signals();

    let server = HttpServer::new(&config, store)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
