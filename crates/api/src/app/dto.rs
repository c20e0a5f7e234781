//! Request body helpers.
//!
//! Bodies are decoded into the domain payload types directly; these helpers
//! turn decode failures into 400 responses and fill in owners taken from the
//! URL path.

use axum::response::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use siteerp_core::DomainError;

use crate::app::errors;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Decode a JSON body into `T`.
pub fn parse<T: DeserializeOwned>(body: Value) -> Result<T, Response> {
    serde_json::from_value(body)
        .map_err(|e| errors::validation_error(&DomainError::validation("body", e.to_string())))
}

/// Decode a body for a resource nested under `owner` in the path.
///
/// A body that names a different owner is rejected; a missing owner field is
/// filled in from the path.
pub fn parse_owned<T: DeserializeOwned>(
    mut body: Value,
    field: &'static str,
    owner: i64,
) -> Result<T, Response> {
    let Some(map) = body.as_object_mut() else {
        return Err(errors::validation_error(&DomainError::validation(
            "body",
            "must be a JSON object",
        )));
    };

    match map.get(field) {
        None | Some(Value::Null) => {}
        Some(v) if v.as_i64() == Some(owner) => {}
        Some(_) => {
            return Err(errors::validation_error(&DomainError::validation(
                field,
                "does not match the URL",
            )));
        }
    }

    map.insert(field.to_string(), Value::from(owner));
    parse(body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use siteerp_inventory::NewUnit;

    use super::*;

    #[test]
    fn owner_is_taken_from_the_path() {
        let unit: NewUnit = parse_owned(json!({ "name": "bag" }), "organizationId", 5).unwrap();
        assert_eq!(unit.organization_id.get(), 5);

        let body = json!({ "name": "bag", "organizationId": 5 });
        let same: NewUnit = parse_owned(body, "organizationId", 5).unwrap();
        assert_eq!(same.organization_id.get(), 5);
    }

    #[test]
    fn conflicting_owner_is_rejected() {
        let body = json!({ "name": "bag", "organizationId": 9 });
        let err = parse_owned::<NewUnit>(body, "organizationId", 5).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let err = parse_owned::<NewUnit>(json!(["bag"]), "organizationId", 5).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
