pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::discovery::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Discovery API
        .route("/api/v1/discovery/facets", get(handlers::handle_facets))
        .route("/api/v1/discovery/skills", get(handlers::handle_skills))
        .route("/api/v1/discovery/filter", post(handlers::handle_filter))
        .route("/api/v1/discovery/refresh", post(handlers::handle_refresh))
        .with_state(state)
}
