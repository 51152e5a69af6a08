/// HTTP surface of the habit tracker
///
/// An axum router over the actions module. Errors are rendered as
/// `{"error": message}` by [`ApiError`].

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::storage::SqliteStorage;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SqliteStorage>,
}

impl AppState {
    pub fn new(storage: Arc<SqliteStorage>) -> Self {
        Self { storage }
    }
}

/// Build the router with request tracing and permissive CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/{id}",
            put(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/{id}/stats", get(handlers::habit_stats))
        .route(
            "/api/logs",
            get(handlers::list_logs).post(handlers::log_completion),
        )
        .route("/api/logs/today", get(handlers::today_logs))
        .route("/api/grid", get(handlers::grid))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
