//! Route definitions for the API.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use super::handlers;
use super::middleware::auth::auth_middleware;
use super::SharedState;
use crate::services::auth_service::AuthService;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // API v1 routes
        .nest("/api/v1", api_v1_routes(state.clone()))
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: SharedState) -> Router<SharedState> {
    // Create an AuthService for middleware use
    let auth_service = Arc::new(AuthService::new(
        state.db.clone(),
        Arc::new(state.config.clone()),
    ));

    Router::new()
        // Auth routes - split into public and protected
        .nest("/auth", handlers::auth::public_router())
        .nest(
            "/auth",
            handlers::auth::protected_router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            )),
        )
        // User management routes
        .nest(
            "/users",
            handlers::users::router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            )),
        )
        // Metadata aggregate routes
        .nest(
            "/metadata",
            handlers::metadata::router().layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            )),
        )
        // Read-only sub-record routes (identification, contacts, ...)
        .merge(handlers::records::router().layer(middleware::from_fn_with_state(
            auth_service,
            auth_middleware,
        )))
}
