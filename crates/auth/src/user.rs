//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteerp_core::{DomainResult, Entity, OrganizationId, UserId, Validator};

use crate::{PasswordHash, Role};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 64;

/// A persisted user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub email: String,
    pub role: Role,
    pub designation: Option<String>,
    pub contact_number: Option<String>,
    pub organization_id: Option<OrganizationId>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Request to create a user account (plaintext password, not yet hashed).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub department: Option<String>,
}

impl CreateUser {
    /// Validate fields that do not depend on the tenant the user is placed in.
    pub fn check(&self, v: &mut Validator) {
        let username = self.username.trim();
        v.require_max_len("username", username, MAX_USERNAME_LENGTH);
        if username
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            v.reject("username", "may only contain letters, digits, '_', '-' and '.'");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            v.reject(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        v.require_email("email", &self.email);
    }

    /// Full validation, including the role/organization pairing.
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v);
        match (self.role, self.organization_id) {
            (Role::Superadmin, Some(_)) => {
                v.reject("organizationId", "superadmin accounts cannot belong to an organization");
            }
            (role, None) if !role.is_superadmin() => {
                v.reject("organizationId", format!("required for role '{role}'"));
            }
            _ => {}
        }
        v.finish()
    }

    /// Replace the plaintext password with its hash.
    pub fn into_new_user(self, password_hash: PasswordHash) -> NewUser {
        NewUser {
            username: self.username.trim().to_string(),
            password_hash,
            email: self.email.trim().to_string(),
            role: self.role,
            designation: self.designation,
            contact_number: self.contact_number,
            organization_id: self.organization_id,
            department: self.department,
        }
    }
}

/// A validated user ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: PasswordHash,
    pub email: String,
    pub role: Role,
    pub designation: Option<String>,
    pub contact_number: Option<String>,
    pub organization_id: Option<OrganizationId>,
    pub department: Option<String>,
}
