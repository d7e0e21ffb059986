use crate::config::Config;
use crate::ingest::Ingestor;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod routes_ingest;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Stores forwarded segments and playlists
    pub ingestor: Arc<Ingestor>,
    /// Header carrying the origin URL (parsed from `server.url_header`)
    pub url_header: HeaderName,
}

impl AppContext {
    /// Build the context from a validated config
    pub fn new(config: Config) -> Result<Self> {
        let url_header = HeaderName::try_from(config.server.url_header.as_str())
            .with_context(|| format!("Invalid url_header: {:?}", config.server.url_header))?;

        let ingestor = Ingestor::new(config.storage.root.clone(), config.merge.lock_scope)
            .with_duplicate_verification(config.segments.verify_duplicates);

        Ok(Self {
            config: Arc::new(config),
            ingestor: Arc::new(ingestor),
            url_header,
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let body_limit = ctx.config.server.max_body_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Artifact ingest
        .merge(routes_ingest::ingest_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    tokio::fs::create_dir_all(&config.storage.root)
        .await
        .with_context(|| format!("Failed to create storage root: {:?}", config.storage.root))?;

    tracing::info!(
        "Storing artifacts under {:?} (lock scope: {:?})",
        config.storage.root,
        config.merge.lock_scope
    );

    let ctx = AppContext::new(config)?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
