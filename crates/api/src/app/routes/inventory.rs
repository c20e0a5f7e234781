use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use siteerp_core::{ItemId, UnitId};
use siteerp_inventory::ItemUpdate;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn units_router() -> Router {
    Router::new().route("/:id", get(get_unit))
}

pub fn items_router() -> Router {
    Router::new().route("/:id", get(get_item).patch(update_item))
}

pub async fn get_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<UnitId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_unit(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<ItemId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_item(id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<ItemId>,
    Json(body): Json<Value>,
) -> Response {
    let update: ItemUpdate = match dto::parse(body) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).update_item(id, update).await;
    errors::respond(StatusCode::OK, result)
}
