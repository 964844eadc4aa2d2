//! leasescout-ai - tenant research and property analysis service
//!
//! Startup: CLI args → TOML config → logging → secrets → services → router.
//! Missing provider keys are warnings; the affected routes fail upstream.

use anyhow::{Context, Result};
use clap::Parser;
use leasescout_common::config::{load_toml_config, resolve_config_path, TomlConfig};
use leasescout_common::events::EventBus;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use leasescout_ai::config::ServiceConfig;
use leasescout_ai::services::progress_tracker::SWEEP_INTERVAL;
use leasescout_ai::services::{AiGateway, CensusClient, DocsExporter, HttpTransport};
use leasescout_ai::AppState;

/// Progress events buffered per SSE subscriber
const EVENT_BUS_CAPACITY: usize = 100;

#[derive(Debug, Parser)]
#[command(name = "leasescout-ai", version, about = "Tenant research and property analysis service")]
struct Args {
    /// Listen address (overrides [server] host)
    #[arg(long, env = "LEASESCOUT_HOST")]
    host: Option<String>,

    /// Listen port (overrides [server] port)
    #[arg(long, env = "LEASESCOUT_PORT")]
    port: Option<u16>,

    /// TOML config file
    #[arg(long, env = "LEASESCOUT_CONFIG")]
    config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<TomlConfig> {
    match resolve_config_path(args.config.as_deref()) {
        Some(path) => load_toml_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(TomlConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = load_config(&args)?;

    // RUST_LOG wins over the TOML level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&toml_config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting leasescout-ai (tenant research) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let service_config = ServiceConfig::resolve(&toml_config);

    let transport = HttpTransport::new(service_config.provider_keys.clone())?;
    let gateway = AiGateway::new(Arc::new(transport));
    let census = CensusClient::new(service_config.census_api_key.clone())?;
    let exporter = DocsExporter::new(service_config.google.clone(), service_config.google_folder_id.clone())?;

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let state = AppState::new(gateway, census, exporter, event_bus);

    let _sweeper = state.tracker.spawn_sweeper(SWEEP_INTERVAL);
    info!("Progress session sweep every {} minutes", SWEEP_INTERVAL.as_secs() / 60);

    let app = leasescout_ai::build_router(state);

    let host = args.host.unwrap_or(toml_config.server.host);
    let port = args.port.unwrap_or(toml_config.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    if let Err(e) = axum::serve(listener, app).await {
        warn!("Server stopped with error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
