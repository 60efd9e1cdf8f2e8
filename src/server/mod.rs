//! HTTP front-end.
//!
//! | Route | Handler |
//! | --- | --- |
//! | `GET /` | upload form |
//! | `POST /merge` | merge uploads, 303 to `/success` |
//! | `GET /success?filename=` | download link |
//! | `GET /download/:filename` | one-shot artifact stream |
//! | `GET /health` | liveness |

pub mod error;
pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::delivery::ArtifactDelivery;
use crate::error::Result;
use crate::merge::{LopdfMerger, MergeBackend, MergeOrchestrator};
use crate::storage::{ScratchStorage, sweeper};
use crate::validation::UploadValidator;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: MergeOrchestrator,
    pub delivery: ArtifactDelivery,
    pub max_upload_size: usize,
}

impl AppState {
    /// Build the state for `config` with the lopdf backend.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::with_backend(config, Arc::new(LopdfMerger::new(config.compression)))
    }

    /// Build the state for `config` with a custom merge backend.
    pub fn with_backend(config: &ServerConfig, backend: Arc<dyn MergeBackend>) -> Self {
        let storage = ScratchStorage::new(&config.storage_dir);
        let validator = UploadValidator::new().with_sniffing(config.sniff_content);

        Self {
            orchestrator: MergeOrchestrator::new(storage.clone(), validator, backend),
            delivery: ArtifactDelivery::new(storage),
            max_upload_size: config.max_upload_size,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_size);

    Router::new()
        .route("/", get(handlers::index))
        .route("/merge", post(handlers::merge))
        .route("/success", get(handlers::success))
        .route("/download/:filename", get(handlers::download))
        .route("/health", get(handlers::health))
        .layer(body_limit)
        .with_state(state)
}

/// Run the server until Ctrl+C or SIGTERM.
///
/// The storage directory is created if needed and the artifact sweeper runs
/// alongside the server until shutdown.
pub async fn run(config: ServerConfig) -> Result<()> {
    let storage = ScratchStorage::new(&config.storage_dir);
    storage.ensure_root().await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper = tokio::spawn(sweeper::run(
        storage,
        config.artifact_ttl,
        config.sweep_interval,
        shutdown_rx,
    ));

    let app = create_app(AppState::from_config(&config)).layer(
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        storage_dir = %config.storage_dir.display(),
        max_upload_size = config.max_upload_size,
        sniff_content = config.sniff_content,
        "server ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "artifact sweeper task failed");
    }
    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, starting graceful shutdown"),
        _ = terminate => tracing::info!("SIGTERM received, starting graceful shutdown"),
    }
}
