use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use siteerp_auth::{SessionStore, SessionToken};
use siteerp_infra::session_for;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Authenticated session routes; `/login` is mounted publicly in `build_app`.
pub fn router() -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let body: dto::LoginRequest = match dto::parse(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let user = match services
        .credentials
        .authenticate(&body.username, &body.password)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "invalid username or password",
            );
        }
        Err(e) => return errors::credential_error_to_response(e),
    };

    let token = SessionToken::generate();
    let record = match session_for(&user, Utc::now(), services.session_ttl) {
        Ok(r) => r,
        Err(e) => return errors::authentication_error_to_response(e.into()),
    };
    let expires_at = record.expires_at;
    if let Err(e) = services.sessions.insert(token.clone(), record).await {
        return errors::authentication_error_to_response(e.into());
    }

    tracing::info!(user_id = %user.id, "session opened");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token.as_str(),
            "expiresAt": expires_at,
            "user": user,
        })),
    )
        .into_response()
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    match services.sessions.revoke(ctx.token()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::authentication_error_to_response(e.into()),
    }
}

pub async fn current_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    let result = services.repository.scoped(ctx.principal()).current_user().await;
    errors::respond(StatusCode::OK, result)
}
