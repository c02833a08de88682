//! HTTP router, shared state and the server loop.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::{SharedTaskGateway, SqliteTaskStore};

use super::og;
use super::sitemap;
use super::tasks as tasks_api;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Task gateway; constructed once and injected here
    pub tasks: SharedTaskGateway,
}

impl AppState {
    pub fn new(config: Config, tasks: SharedTaskGateway) -> Self {
        Self { config, tasks }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/og", get(og::og_image))
        .route("/sitemap.xml", get(sitemap::sitemap))
        .nest("/api/tasks", tasks_api::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = SqliteTaskStore::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open task database at {}",
            config.database_path.display()
        )
    })?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = Arc::new(AppState::new(config, Arc::new(store)));
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serve the router on an already bound listener until `shutdown` resolves.
///
/// In-flight requests are drained before this returns.
pub async fn serve_with_shutdown<F>(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
///
/// A signal that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!("Received {}, shutting down", received);
}

/// Health check endpoint.
async fn health(State(_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
