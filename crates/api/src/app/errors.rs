use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use siteerp_auth::{AuthenticationError, CredentialError};
use siteerp_core::DomainError;
use siteerp_infra::RepositoryError;

pub fn repository_error_to_response(err: RepositoryError) -> Response {
    match err {
        RepositoryError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        RepositoryError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        RepositoryError::Validation(e) => validation_error(&e),
        RepositoryError::TransactionFailure(msg) => {
            tracing::error!("transaction rolled back: {msg}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transaction_failure",
                "the operation failed and no changes were applied",
            )
        }
        RepositoryError::Credential(e) => credential_error_to_response(e),
        RepositoryError::Store(e) => {
            tracing::error!("store failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal error")
        }
    }
}

pub fn authentication_error_to_response(err: AuthenticationError) -> Response {
    match err {
        AuthenticationError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
        }
        AuthenticationError::SessionStore(e) => {
            tracing::error!("session store failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", "internal error")
        }
    }
}

pub fn credential_error_to_response(err: CredentialError) -> Response {
    tracing::error!("credential failure: {err}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "credential_error", "internal error")
}

/// 400 with field-level detail.
pub fn validation_error(err: &DomainError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": err.to_string(),
            "fields": err.fields(),
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Serialize a repository result, or map its error.
pub fn respond<T: Serialize>(status: StatusCode, result: Result<T, RepositoryError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(e) => repository_error_to_response(e),
    }
}
