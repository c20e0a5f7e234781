use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteerp_auth::{CreateUser, Role};
use siteerp_core::{DomainError, DomainResult, Entity, OrganizationId, PrimaryContact, Validator};

/// Top-level tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub contact: PrimaryContact,
    pub created_at: DateTime<Utc>,
}

impl Entity for Organization {
    type Id = OrganizationId;

    fn id(&self) -> OrganizationId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub contact: PrimaryContact,
}

impl NewOrganization {
    pub fn check(&self, v: &mut Validator) {
        v.require_max_len("name", &self.name, 200)
            .require("address", &self.address);
        self.contact.check(v);
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v);
        v.finish()
    }
}

/// A new organization together with its first administrator.
///
/// Both are created in one transaction. The admin's organization is assigned
/// by the store once the organization row exists, so any `organizationId` in
/// the request is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrganizationSetup {
    pub organization: NewOrganization,
    pub admin: CreateUser,
}

impl OrganizationSetup {
    /// Validate both payloads, reporting fields as `organization.*` / `admin.*`.
    pub fn validate(&self) -> DomainResult<()> {
        let mut fields = Vec::new();

        if let Err(e) = self.organization.validate() {
            fields.extend(e.nested("organization").fields().iter().cloned());
        }

        let mut v = Validator::new();
        self.admin.check(&mut v);
        if self.admin.role != Role::Admin {
            v.reject("role", "initial account of an organization must be an admin");
        }
        if let Err(e) = v.finish() {
            fields.extend(e.nested("admin").fields().iter().cloned());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_json() -> serde_json::Value {
        serde_json::json!({
            "organization": {
                "name": "Acme Co",
                "address": "1 Main St",
                "primaryContactName": "Dana",
                "primaryContactNumber": "555-0100",
                "designation": "Director",
                "primaryEmail": "dana@acme.test",
                "primaryPhone": "555-0101"
            },
            "admin": {
                "username": "acme_admin",
                "password": "password123",
                "email": "admin@acme.test",
                "role": "admin"
            }
        })
    }

    #[test]
    fn parses_and_validates_request_body() {
        let setup: OrganizationSetup = serde_json::from_value(setup_json()).unwrap();
        assert_eq!(setup.organization.name, "Acme Co");
        assert_eq!(setup.organization.contact.email, "dana@acme.test");
        assert!(setup.validate().is_ok());
    }

    #[test]
    fn reports_nested_field_paths() {
        let mut body = setup_json();
        body["organization"]["name"] = "".into();
        body["admin"]["role"] = "employee".into();
        body["admin"]["email"] = "nope".into();
        let setup: OrganizationSetup = serde_json::from_value(body).unwrap();

        let err = setup.validate().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["organization.name", "admin.email", "admin.role"]);
    }

    #[test]
    fn serializes_contact_inline() {
        let org = Organization {
            id: OrganizationId::new(3),
            name: "Acme Co".into(),
            address: "1 Main St".into(),
            contact: PrimaryContact {
                name: "Dana".into(),
                number: "555-0100".into(),
                designation: "Director".into(),
                email: "dana@acme.test".into(),
                phone: "555-0101".into(),
            },
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&org).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["primaryContactName"], "Dana");
        assert!(json.get("contact").is_none());
    }
}
