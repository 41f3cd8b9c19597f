//! HTTP API for the route service.

pub mod request_id;
mod routes;

pub use routes::ApiError;

use crate::state::AppState;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

/// Full application: API routes, health check and the shared layers.
pub fn app(state: Arc<AppState>) -> Router {
    routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests;
