use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use siteerp_core::VendorId;
use siteerp_parties::VendorUpdate;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/:id", get(get_vendor).patch(update_vendor))
}

pub async fn get_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<VendorId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_vendor(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn update_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<VendorId>,
    Json(body): Json<Value>,
) -> Response {
    let update: VendorUpdate = match dto::parse(body) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).update_vendor(id, update).await;
    errors::respond(StatusCode::OK, result)
}
