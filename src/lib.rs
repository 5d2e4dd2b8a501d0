//! Bolão Server Library
//!
//! Round-based football prediction pool: users pick home/draw/away per match,
//! an admin settles outcomes, standings are summed per round and globally.
//! This module exposes the server components for integration testing.

pub mod api;
pub mod auth;
pub mod betting;
pub mod config;
pub mod db;
pub mod error;

use axum::{routing::get, Router};
use betting::Clock;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Creates the application router with all endpoints
pub fn create_app(state: Arc<api::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Bolao Server" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/bets", api::bets_router().with_state(state.clone()))
        .nest(
            "/api/rankings",
            api::rankings_router().with_state(state.clone()),
        )
        .nest("/api/pools", api::pools_router().with_state(state.clone()))
        .nest(
            "/api/tournaments",
            api::tournaments_router().with_state(state.clone()),
        )
        .nest("/api/rounds", api::rounds_router().with_state(state.clone()))
        .nest("/api/matches", api::matches_router().with_state(state))
        .layer(cors)
}

/// Test helper to create an in-memory database and run migrations
pub async fn create_test_db() -> db::DbPool {
    // Shared-cache named memory db: every pooled connection must see the same
    // schema, and each test gets its own name so parallel tests stay isolated.
    let url = format!(
        "sqlite:file:testdb-{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let pool = db::create_pool(&url)
        .await
        .expect("Failed to create in-memory database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test helper to create a fully configured test app pinned to a fixed clock,
/// so lock-window behavior does not depend on the day the suite runs.
pub async fn create_test_app_at(
    now: chrono::DateTime<chrono::Utc>,
) -> (Router, db::DbPool, Arc<auth::JwtManager>) {
    let pool = create_test_db().await;
    let jwt_manager = Arc::new(auth::JwtManager::new("test_secret_key".to_string()));

    let state = Arc::new(api::AppState {
        pool: pool.clone(),
        jwt_manager: jwt_manager.clone(),
        clock: Clock::Fixed(now),
    });

    (create_app(state), pool, jwt_manager)
}

/// Test helper defaulting to a weekday morning (betting window open).
pub async fn create_test_app() -> (Router, db::DbPool, Arc<auth::JwtManager>) {
    use chrono::TimeZone;

    // Wednesday 2026-08-26 12:00 in the reference zone
    let now = chrono::Utc.with_ymd_and_hms(2026, 8, 26, 15, 0, 0).unwrap();
    create_test_app_at(now).await
}
