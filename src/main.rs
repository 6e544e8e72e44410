//! EventHub API server
//!
//! Main application entry point

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use EventHub::{
    config::Settings,
    database::open_store,
    handlers::build_router,
    services::LocalObjectStore,
    state::AppState,
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", EventHub::info());

    info!(backend = ?settings.database.backend, "Opening document store...");
    let store = open_store(&settings.database).await?;

    let objects = Arc::new(LocalObjectStore::new(&settings.storage)?);
    tokio::fs::create_dir_all(objects.root()).await?;

    let address = settings.bind_address();
    let state = AppState::new(settings, store, objects);

    let health = state.services.health_check().await;
    if !health.is_healthy() {
        for issue in health.get_issues() {
            error!(issue = %issue, "Startup health check failed");
        }
    }

    let _limiter_cleanup = state.services.login_limiter.start_cleanup_task();

    let app = build_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("EventHub API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("EventHub API has been shut down.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
