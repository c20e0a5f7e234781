//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend, sessions, credentials and repository
//! - `routes/`: HTTP routes + handlers (one file per resource family)
//! - `dto.rs`: request body decoding helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        resolver: Arc::clone(&services.resolver),
    };

    // Protected routes: require a live session.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/api/login", post(routes::session::login))
        .layer(Extension(services));

    public.merge(protected).layer(ServiceBuilder::new())
}
