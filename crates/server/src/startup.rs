use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::{runtime, FileRecordStore, PORTFOLIO_COLLECTIONS};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn parse_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let addr = cfg.server.bind_addr();
    addr.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {addr}: {e}")))
}

/// Open the record store under the configured data directory and build the app.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.storage.data_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let store = FileRecordStore::open(&cfg.storage.data_dir, PORTFOLIO_COLLECTIONS).await?;
    info!(data_dir = %store.data_dir().display(), collections = store.specs().len(), "record store ready");

    let state = ServerState { store };
    Ok(routes::build_router(state, build_cors()))
}

/// Serve until Ctrl+C. Logging must already be initialized.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = parse_bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "portfolio server listening");
    serve_until(listener, app, ctrl_c()).await
}

/// Serve `app` until `shutdown` resolves, letting in-flight requests finish.
/// Every mutation is written before its response, so there is nothing to flush.
pub async fn serve_until<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("portfolio server stopped");
    Ok(())
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
