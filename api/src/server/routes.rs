//! Router configuration for the events API.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::auth::handlers::issue_token;
use crate::events;
use crate::index::index;
use axum::{
    Router,
    middleware::map_response_with_state,
    routing::{get, post},
};
use natural_web::{correlation_id_layer, link_error_index};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures all routes including:
/// - Health checks
/// - The OAuth2 token endpoint
/// - The API index and event endpoints
///
/// Error bodies get their absolute index link from the state's base URL.
pub fn build_router(state: AppState) -> Router {
    // API routes
    let api_routes = Router::new()
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .patch(events::patch_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/publish", post(events::publish_event));

    let base_url = state.links.shared_base();

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/oauth/token", post(issue_token))
        .route("/api", get(index))
        .route("/api/", get(index))
        .nest("/api", api_routes)
        .layer(map_response_with_state(base_url, link_error_index))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
