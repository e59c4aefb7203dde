use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::{info, Level};

use budget_builder_backend::{create_router, initialize_backend};

/// Where the shared budget document lives: `BUDGET_DATA_DIR` if set, else the
/// platform data directory, else `./data` as a last resort.
fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BUDGET_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("budget-builder"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let data_dir = resolve_data_dir();
    info!("using data directory {:?}", data_dir);

    let app_state = initialize_backend(&data_dir)?;
    let sync_service = app_state.sync_service.clone();
    let app = create_router(app_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Don't lose an edit burst that was still inside its debounce window.
    info!("shutting down, flushing pending budget state");
    sync_service.flush()?;

    Ok(())
}
