use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use siteerp_core::{SiteContactId, SiteId};
use siteerp_parties::{NewSiteContact, SiteUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_site).patch(update_site))
        .route("/:id/contacts", get(list_contacts).post(create_contact))
}

pub async fn get_site(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<SiteId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_site(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn update_site(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<SiteId>,
    Json(body): Json<Value>,
) -> Response {
    let update: SiteUpdate = match dto::parse(body) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).update_site(id, update).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn list_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<SiteId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).list_site_contacts(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<SiteId>,
    Json(body): Json<Value>,
) -> Response {
    let new: NewSiteContact = match dto::parse_owned(body, "siteId", id.get()) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let result = services
        .repository
        .scoped(ctx.principal())
        .create_site_contact(new)
        .await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn get_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<SiteContactId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_site_contact(id).await;
    errors::respond(StatusCode::OK, result)
}
