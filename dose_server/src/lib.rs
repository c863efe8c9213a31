//! HTTP surface of the dose log service.
//!
//! | Route | Purpose |
//! |---|---|
//! | `POST /log_dose` | record one TAKEN / MISSED event |
//! | `GET /api/events` | filtered event listing, newest first |
//! | `GET /api/statistics` | adherence statistics over a trailing window |
//! | `GET /dashboard` | static dashboard page |
//! | `GET /` | service index |

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use dose_core::{Config, DoseStore, PgStore};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod routes;
pub mod state;

use routes::{
    dashboard_handler, events_handler, index_handler, log_dose_handler, statistics_handler,
};
pub use state::AppState;

/// Build the application router
pub fn build_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(index_handler))
        .route("/log_dose", post(log_dose_handler))
        .route("/api/events", get(events_handler))
        .route("/api/statistics", get(statistics_handler))
        .route("/dashboard", get(dashboard_handler))
        .layer(TraceLayer::new_for_http());

    let router = if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

/// Open the configured store
///
/// `in_memory` swaps PostgreSQL for a process-local store that is lost on
/// exit.
pub async fn open_store(config: &Config, in_memory: bool) -> dose_core::Result<Arc<dyn DoseStore>> {
    if in_memory {
        info!("Using in-memory store; events will not survive a restart");
        return Ok(Arc::new(dose_core::MemoryStore::new()));
    }

    let store = PgStore::connect_lazy(&config.database)?;
    if config.database.create_schema {
        store.ensure_schema().await?;
    }
    Ok(Arc::new(store))
}

/// Serve until Ctrl+C or SIGTERM
pub async fn serve(config: &Config, store: Arc<dyn DoseStore>) -> dose_core::Result<()> {
    let state = AppState::new(store, config.server.dashboard_path.clone());
    let app = build_router(state, config.server.cors);

    info!("Binding to {}", config.server.bind);
    let listener = TcpListener::bind(config.server.bind.as_str()).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
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
}
