pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use word_progress_core::AlgorithmRegistry;

use crate::config::Config;
use crate::db::Database;
use crate::services::sessions::SessionRegistry;
use crate::store::{MemoryStore, RowStore};

/// Shared application state
pub struct AppState<S> {
    pub store: Arc<S>,
    pub sessions: Arc<SessionRegistry>,
    pub algorithms: Arc<AlgorithmRegistry>,
}

impl<S> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(SessionRegistry::new()),
            algorithms: Arc::new(AlgorithmRegistry::default()),
        }
    }
}

// Derived Clone would demand S: Clone.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sessions: self.sessions.clone(),
            algorithms: self.algorithms.clone(),
        }
    }
}

/// Build the full router over any row store.
pub fn build_router<S: RowStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Assessment routes
        .route("/api/assessments", post(routes::assessments::start::<S>))
        .route(
            "/api/assessments/:id/answer",
            post(routes::assessments::answer::<S>),
        )
        // Review routes
        .route("/api/reviews/schedule", post(routes::reviews::schedule::<S>))
        // Progress routes
        .route(
            "/api/progress/:user_id/:word_id",
            get(routes::progress::get::<S>),
        )
        .route(
            "/api/history/:user_id/:word_id",
            get(routes::progress::history::<S>),
        )
        .route(
            "/api/schedule-logs/:user_id/:word_id",
            get(routes::progress::schedule_logs::<S>),
        )
        .route("/api/users/:user_id/due", get(routes::progress::due::<S>))
        // Catalog and action log
        .route("/api/words/:word_id", put(routes::words::register::<S>))
        .route("/api/actions", post(routes::actions::record::<S>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url, config.max_connections).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;

            build_router(AppState::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, progress is kept in memory only");
            build_router(AppState::new(MemoryStore::with_default_strategies()))
        }
    };

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
