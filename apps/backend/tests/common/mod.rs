//! Common test utilities for the HTTP integration tests.
//!
//! Most tests run against the in-process store. Tests marked
//! `#[ignore = "requires database"]` need a PostgreSQL database in
//! DATABASE_URL.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;

use word_progress_backend::db::Database;
use word_progress_backend::store::MemoryStore;
use word_progress_backend::{build_router, AppState};

/// Test context holding the in-process store behind a router.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    app: Router,
}

impl TestContext {
    /// Store seeded with the default strategies and the given words.
    pub fn new(words: &[&str]) -> Self {
        let store = MemoryStore::with_default_strategies();
        for word in words {
            store.add_word(word);
        }

        let state = AppState::new(store);
        let store = state.store.clone();
        let app = build_router(state);

        Self { store, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Router over a migrated PostgreSQL database.
///
/// # Panics
/// Panics if DATABASE_URL is not set or the database is unreachable.
pub async fn database_router() -> (Arc<Database>, Router) {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let db = Database::connect(&database_url, 2)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(db);
    let db = state.store.clone();
    (db, build_router(state))
}
