use serde::Serialize;
use thiserror::Error;

use siteerp_core::{OrganizationId, UserId};

use crate::Role;

/// The set of organizations a principal may act on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "organization_id", rename_all = "snake_case")]
pub enum Scope {
    /// Every organization (superadmin).
    Unrestricted,
    /// Exactly one organization.
    Organization(OrganizationId),
}

impl Scope {
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            Scope::Unrestricted => None,
            Scope::Organization(id) => Some(*id),
        }
    }

    pub fn includes(&self, organization_id: OrganizationId) -> bool {
        match self {
            Scope::Unrestricted => true,
            Scope::Organization(id) => *id == organization_id,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("{0} principal must belong to exactly one organization")]
    MissingOrganization(Role),

    #[error("superadmin principal must not be bound to an organization")]
    ScopedSuperadmin,
}

/// An authenticated caller.
///
/// Construction enforces the tenancy invariant: superadmins carry no
/// organization, every other role carries exactly one. Fields are private so a
/// resolved principal cannot be altered for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    user_id: UserId,
    role: Role,
    organization_id: Option<OrganizationId>,
}

impl Principal {
    pub fn new(
        user_id: UserId,
        role: Role,
        organization_id: Option<OrganizationId>,
    ) -> Result<Self, PrincipalError> {
        match (role, organization_id) {
            (Role::Superadmin, Some(_)) => Err(PrincipalError::ScopedSuperadmin),
            (Role::Superadmin, None) => Ok(Self::superadmin(user_id)),
            (role, Some(org)) => Ok(Self {
                user_id,
                role,
                organization_id: Some(org),
            }),
            (role, None) => Err(PrincipalError::MissingOrganization(role)),
        }
    }

    pub fn superadmin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Superadmin,
            organization_id: None,
        }
    }

    /// Tenant member of `organization_id`.
    ///
    /// Returns an error if `role` is `Superadmin`.
    pub fn member(
        user_id: UserId,
        role: Role,
        organization_id: OrganizationId,
    ) -> Result<Self, PrincipalError> {
        Self::new(user_id, role, Some(organization_id))
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    pub fn is_superadmin(&self) -> bool {
        self.role.is_superadmin()
    }

    pub fn scope(&self) -> Scope {
        match self.organization_id {
            Some(org) if !self.is_superadmin() => Scope::Organization(org),
            _ => Scope::Unrestricted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmin_is_unscoped() {
        let p = Principal::new(UserId::new(1), Role::Superadmin, None).unwrap();
        assert_eq!(p.scope(), Scope::Unrestricted);
        assert!(p.scope().includes(OrganizationId::new(99)));
    }

    #[test]
    fn members_require_an_organization() {
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            assert_eq!(
                Principal::new(UserId::new(2), role, None),
                Err(PrincipalError::MissingOrganization(role))
            );
            let p = Principal::member(UserId::new(2), role, OrganizationId::new(5)).unwrap();
            assert_eq!(p.scope(), Scope::Organization(OrganizationId::new(5)));
            assert!(!p.scope().includes(OrganizationId::new(6)));
        }
    }

    #[test]
    fn superadmin_bound_to_org_is_rejected() {
        assert_eq!(
            Principal::new(UserId::new(1), Role::Superadmin, Some(OrganizationId::new(5))),
            Err(PrincipalError::ScopedSuperadmin)
        );
    }
}
