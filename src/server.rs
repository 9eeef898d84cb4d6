use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    ledger::{identity_provider, HostIdentity, LedgerStore},
    metrics,
    signals::setup_signal_handlers,
    static_files,
};

/// Start the hoststats server
///
/// This function:
/// 1. Opens the request ledger and registers this host in it
/// 2. Initializes metrics
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Binds to the configured address and serves until a signal arrives
/// 5. Closes the ledger
pub async fn start_server(config: Config) -> Result<()> {
    let ledger = Arc::new(LedgerStore::open(&config.ledger).await);
    let identity = identity_provider(&config.ledger).identity();
    let server_id = register_with_retry(&ledger, &identity).await;
    info!(server_id, "Starting... Server_ID: {}", server_id);

    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);
    metrics::record_server_id(server_id);

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(AppState::new(ledger.clone()), metrics_handle);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid bind address '{}'", config.server.host))?,
        config.server.port,
    ));

    info!("Listening on http://{}", addr);
    match ledger.database_path() {
        Some(path) => info!("Request ledger at {}", path.display()),
        None => tracing::warn!("Request ledger unavailable, pages will show placeholder data"),
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Peer addresses feed the request log
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
        info!("Shutdown signal received, draining connections...");
    })
    .await?;

    signal_handle.await?;
    info!(server_id = ledger.server_id(), "Exiting... Server_ID: {}", ledger.server_id());
    ledger.close().await;

    Ok(())
}

/// Delay before the second registration attempt
const REGISTER_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Register this host, retrying once if an open ledger rejects the first attempt
///
/// Returns `0` when both attempts fail; requests are then logged without a
/// server id.
async fn register_with_retry(ledger: &LedgerStore, identity: &HostIdentity) -> i64 {
    let server_id = ledger.register_self(identity).await;
    if server_id != 0 || !ledger.is_available() {
        return server_id;
    }

    tokio::time::sleep(REGISTER_RETRY_DELAY).await;
    let server_id = ledger.register_self(identity).await;
    if server_id == 0 {
        tracing::warn!(
            hostname = %identity.hostname,
            ip = %identity.ip,
            "Host registration failed, requests will be logged without a server id"
        );
    }
    server_id
}

/// Create the Axum router with all routes and middleware
pub fn create_router(app_state: AppState, metrics_handle: Arc<PrometheusHandle>) -> Router {
    // Ledger-backed routes; all but /health log the request first
    let pages = Router::new()
        .route("/", get(handlers::pages::stats_page))
        .route("/servers", get(handlers::pages::servers_page))
        .route("/servers/:server_id", get(handlers::pages::server_requests_page))
        .route("/requests", get(handlers::pages::requests_page))
        .route("/json", get(handlers::export::json_snapshot))
        .route("/yaml", get(handlers::export::yaml_snapshot))
        .route("/health", get(handlers::health::health_check))
        .fallback(handlers::pages::not_found)
        .with_state(app_state);

    Router::new()
        .route("/favicon.ico", get(static_files::favicon_ico))
        .route("/favicon.png", get(static_files::favicon_png))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(pages)
        .layer(TraceLayer::new_for_http())
}
