use axum::{routing::get, Router};

pub mod customers;
pub mod inventory;
pub mod organizations;
pub mod session;
pub mod sites;
pub mod system;
pub mod vendors;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/api", api_router())
}

fn api_router() -> Router {
    Router::new()
        .merge(session::router())
        .nest("/organizations", organizations::router())
        .nest("/customers", customers::router())
        .nest("/sites", sites::router())
        .route("/contacts/:id", get(sites::get_contact))
        .nest("/vendors", vendors::router())
        .nest("/units", inventory::units_router())
        .nest("/items", inventory::items_router())
}
