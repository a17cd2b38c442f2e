//! Route definitions

use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // Cross-origin callers may read reports but never start a run.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD]);

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/research", post(handlers::research_form))
        .route("/reports", get(handlers::reports_list))
        .route("/reports/:name", get(handlers::report_view))
        .route("/stats", get(handlers::stats))
        // Live progress
        .route("/ws/research", get(ws::research_handler))
        // API routes
        .route("/api/research", post(handlers::api_research))
        .route("/api/reports", get(handlers::api_reports))
        .route("/api/reports/:name", get(handlers::api_report_raw))
        .route("/health", get(handlers::health))
        // Static routes
        .route("/favicon.ico", get(handlers::favicon))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        // Add state
        .with_state(state)
}
