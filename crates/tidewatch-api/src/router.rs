//! Axum router construction for the Query Service.
//!
//! CORS is wide open so browser map overlays served from another
//! origin can poll the API.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// - `GET /api/ping` -- liveness probe
/// - `GET /api/state` -- latest snapshot
///
/// Anything else gets a JSON 404.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ping", get(handlers::ping))
        .route("/api/state", get(handlers::get_state))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
