//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session lifecycle
        .route("/sessions", post(handlers::session::start_session))
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route("/sessions/{id}", delete(handlers::session::delete_session))
        .route("/sessions/{id}/end", post(handlers::session::end_session))
        // Message exchange
        .route(
            "/sessions/{id}/messages",
            post(handlers::message::submit_message).get(handlers::message::get_messages),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
