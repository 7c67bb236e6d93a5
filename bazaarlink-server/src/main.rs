use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use bazaarlink::similarity::spawn_periodic_retraining;
use bazaarlink::storage::MemoryCatalog;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod api;
mod cli;
mod config;
mod error;
mod state;

use crate::api::create_router;
use crate::cli::CliArgs;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli_args = CliArgs::parse();

    // Load configuration from CLI arguments and environment variables
    let server_config = ServerConfig::from_cli_and_env(cli_args)?;
    let mut engine_config = server_config.engine_config()?;
    if let Some(level) = &server_config.log_level {
        engine_config.logging.level = bazaarlink::logging::parse_log_level(level)?;
    }

    // Keep the guard alive so file logs are flushed until shutdown
    let _log_guard = bazaarlink::logging::init(&engine_config.logging)?;

    info!("Starting BazaarLink server v{}", bazaarlink::VERSION);

    let catalog = match &server_config.catalog_path {
        Some(path) => {
            info!("Loading catalog snapshot from {}", path.display());
            MemoryCatalog::load(path).await?
        }
        None => {
            warn!("No catalog snapshot provided, starting with an empty catalog");
            MemoryCatalog::new()
        }
    };

    let schedule = engine_config
        .training
        .schedule_enabled
        .then_some(engine_config.training.retrain_interval);

    let engine = Arc::new(bazaarlink::init(engine_config, Arc::new(catalog)).await?);
    info!("Recommendation engine initialized");

    if let Some(interval) = schedule {
        spawn_periodic_retraining(Arc::clone(engine.trainer()), interval);
        info!("Scheduled model retraining every {:?}", interval);
    }
    if server_config.retrain_on_start {
        drop(engine.retrain_model());
    }

    let app_state = Arc::new(AppState::new(engine, server_config.clone()));

    // Create the router with all API endpoints
    let app = create_router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("API documentation available at http://{}/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
