//! Resource-level authorization: locate the owner, then decide.

use thiserror::Error;
use tracing::instrument;

use siteerp_auth::{Action, Decision, Principal, explain};
use siteerp_core::{OrganizationId, ResourceRef};

use crate::locator::{LocateError, ResourceLocator};
use crate::store::{DataStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Denied, or the resource does not exist and the caller may not learn that.
    #[error("forbidden")]
    Forbidden,

    /// Only reported to callers who may see every organization.
    #[error("{0} not found")]
    NotFound(ResourceRef),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answers "may this principal do this to that resource?".
#[derive(Debug, Clone)]
pub struct Authorizer<S> {
    locator: ResourceLocator<S>,
}

impl<S: DataStore> Authorizer<S> {
    pub fn new(store: S) -> Self {
        Self {
            locator: ResourceLocator::new(store),
        }
    }

    pub fn locator(&self) -> &ResourceLocator<S> {
        &self.locator
    }

    /// Verdict for `action` on `resource`.
    ///
    /// A resource that cannot be located has no owning organization, so the
    /// verdict is the one for an unscoped target: only a superadmin is allowed.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: ResourceRef,
    ) -> Result<Decision, StoreError> {
        let target = match self.locator.locate(resource).await {
            Ok(org) => Some(org),
            Err(LocateError::NotFound(_)) => None,
            Err(LocateError::Store(e)) => return Err(e),
        };
        Ok(verdict(principal, action, target, resource))
    }

    /// Like `authorize`, but returns the owning organization on allow and
    /// a typed error otherwise.
    #[instrument(
        skip(self, principal),
        fields(user_id = %principal.user_id(), action = %action, resource = %resource),
        err
    )]
    pub async fn require(
        &self,
        principal: &Principal,
        action: Action,
        resource: ResourceRef,
    ) -> Result<OrganizationId, AccessError> {
        match self.locator.locate(resource).await {
            Ok(org) => match verdict(principal, action, Some(org), resource) {
                Decision::Allow => Ok(org),
                Decision::Deny => Err(AccessError::Forbidden),
            },
            Err(LocateError::NotFound(r)) if principal.is_superadmin() => {
                Err(AccessError::NotFound(r))
            }
            Err(LocateError::NotFound(_)) => {
                tracing::warn!(
                    user_id = %principal.user_id(),
                    %resource,
                    "access to unknown resource denied"
                );
                Err(AccessError::Forbidden)
            }
            Err(LocateError::Store(e)) => Err(AccessError::Store(e)),
        }
    }
}

fn verdict(
    principal: &Principal,
    action: Action,
    target: Option<OrganizationId>,
    resource: ResourceRef,
) -> Decision {
    let explanation = explain(principal, action, target);
    if explanation.decision.is_allowed() {
        tracing::debug!(rule = ?explanation.rule, %resource, "{}", explanation.reason);
    } else {
        tracing::warn!(
            user_id = %principal.user_id(),
            rule = ?explanation.rule,
            %resource,
            "access denied: {}",
            explanation.reason
        );
    }
    explanation.decision
}
