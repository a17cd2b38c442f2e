//! deep-research-rs web server
//!
//! Serves the research UI and JSON API.

use anyhow::Result;
use clap::Parser;
use deep_research_rs::{
    agents,
    config::{self, Settings},
    metrics::ResearchMetrics,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "deep-research-rs", version, about = "Deep research web UI")]
struct Args {
    /// Path to settings.yml
    #[arg(short, long, env = "RESEARCH_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Port to listen on (falls back to a free port if taken)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting deep-research-rs v{}", deep_research_rs::VERSION);

    // Load configuration
    let mut settings = config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(bind) = args.bind {
        settings.server.bind_address = bind;
    }
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Wire the research pipeline
    let metrics = Arc::new(ResearchMetrics::new());
    let manager = agents::build_manager(&settings, &client, metrics)?;
    info!(
        "Reports will be saved to {}",
        manager.store().dir().display()
    );

    // Create application state
    let state = AppState::new(settings.clone(), manager)?;
    let app = create_router(state);

    let listener = bind(&settings).await?;
    info!("🚀 Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind the configured address, or any free port on the same interface
async fn bind(settings: &Settings) -> Result<TcpListener> {
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            warn!("Port {} is in use, picking a free one", settings.server.port);
            Ok(TcpListener::bind(SocketAddr::new(addr.ip(), 0)).await?)
        }
        Err(e) => Err(e.into()),
    }
}
