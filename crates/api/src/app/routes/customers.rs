use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use siteerp_core::CustomerId;
use siteerp_parties::{CustomerUpdate, NewSite};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_customer).patch(update_customer))
        .route("/:id/sites", get(list_sites).post(create_site))
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<CustomerId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_customer(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<CustomerId>,
    Json(body): Json<Value>,
) -> Response {
    let update: CustomerUpdate = match dto::parse(body) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let result = services
        .repository
        .scoped(ctx.principal())
        .update_customer(id, update)
        .await;
    errors::respond(StatusCode::OK, result)
}

pub async fn list_sites(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<CustomerId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).list_sites(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_site(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<CustomerId>,
    Json(body): Json<Value>,
) -> Response {
    let new: NewSite = match dto::parse_owned(body, "customerId", id.get()) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).create_site(new).await;
    errors::respond(StatusCode::CREATED, result)
}
