//! Organizations and everything listed or created under one.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use siteerp_auth::CreateUser;
use siteerp_core::OrganizationId;
use siteerp_inventory::{NewItem, NewUnit};
use siteerp_parties::{NewCustomer, NewVendor};
use siteerp_tenancy::OrganizationSetup;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

const OWNER: &str = "organizationId";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_organization).get(list_organizations))
        .route("/:org_id", get(get_organization))
        .route("/:org_id/customers", post(create_customer).get(list_customers))
        .route("/:org_id/vendors", post(create_vendor).get(list_vendors))
        .route("/:org_id/units", post(create_unit).get(list_units))
        .route("/:org_id/items", post(create_item).get(list_items))
        .route("/:org_id/users", post(create_user).get(list_users))
}

pub async fn create_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<Value>,
) -> Response {
    let setup: OrganizationSetup = match dto::parse(body) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let result = services
        .repository
        .scoped(ctx.principal())
        .create_organization_with_admin(setup)
        .await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn list_organizations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).list_organizations().await;
    errors::respond(StatusCode::OK, result)
}

pub async fn get_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).get_organization(org_id).await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
    Json(body): Json<Value>,
) -> Response {
    let new: NewCustomer = match dto::parse_owned(body, OWNER, org_id.get()) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).create_customer(new).await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
) -> Response {
    let result = services
        .repository
        .scoped(ctx.principal())
        .list_customers(Some(org_id))
        .await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
    Json(body): Json<Value>,
) -> Response {
    let new: NewVendor = match dto::parse_owned(body, OWNER, org_id.get()) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).create_vendor(new).await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn list_vendors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
) -> Response {
    let result = services
        .repository
        .scoped(ctx.principal())
        .list_vendors(Some(org_id))
        .await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
    Json(body): Json<Value>,
) -> Response {
    let new: NewUnit = match dto::parse_owned(body, OWNER, org_id.get()) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).create_unit(new).await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn list_units(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
) -> Response {
    let result = services
        .repository
        .scoped(ctx.principal())
        .list_units(Some(org_id))
        .await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
    Json(body): Json<Value>,
) -> Response {
    let new: NewItem = match dto::parse_owned(body, OWNER, org_id.get()) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).create_item(new).await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
) -> Response {
    let result = services
        .repository
        .scoped(ctx.principal())
        .list_items(Some(org_id))
        .await;
    errors::respond(StatusCode::OK, result)
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
    Json(body): Json<Value>,
) -> Response {
    let create: CreateUser = match dto::parse_owned(body, OWNER, org_id.get()) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let result = services.repository.scoped(ctx.principal()).create_user(create).await;
    errors::respond(StatusCode::CREATED, result)
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(org_id): Path<OrganizationId>,
) -> Response {
    let result = services
        .repository
        .scoped(ctx.principal())
        .list_users(Some(org_id))
        .await;
    errors::respond(StatusCode::OK, result)
}
