//! Tenant-scoped repository facade.
//!
//! Every operation runs on behalf of one `Principal`:
//! - targeted operations (get/create/update) locate the owning organization
//!   and consult the decision engine before the store is touched
//! - list operations filter by the principal's scope
//! - a denied request never reaches the store
//!
//! ```ignore
//! let repo = TenantRepository::new(store, credentials);
//! let customers = repo.scoped(&principal).list_customers(None).await?;
//! ```

use std::sync::Arc;

use thiserror::Error;

use siteerp_auth::{Action, CredentialError, CredentialVerifier, Principal, Scope, decide};
use siteerp_core::{DomainError, OrganizationId, ResourceRef};

use crate::authz::{AccessError, Authorizer};
use crate::store::{DataStore, StoreError};

mod inventory;
mod organizations;
mod parties;

pub use organizations::OrganizationWithAdmin;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Denied. Also used for missing resources when the caller may not learn
    /// whether they exist.
    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(#[from] DomainError),

    /// A multi-write operation failed and was rolled back.
    #[error("transaction failed: {0}")]
    TransactionFailure(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AccessError> for RepositoryError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden => RepositoryError::Forbidden,
            AccessError::NotFound(resource) => RepositoryError::NotFound(resource.to_string()),
            AccessError::Store(e) => RepositoryError::Store(e),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Shared facade; cheap to clone when `S` is.
#[derive(Clone)]
pub struct TenantRepository<S> {
    store: S,
    authorizer: Authorizer<S>,
    credentials: Arc<dyn CredentialVerifier>,
}

impl<S: DataStore + Clone> TenantRepository<S> {
    pub fn new(store: S, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            authorizer: Authorizer::new(store.clone()),
            store,
            credentials,
        }
    }
}

impl<S: DataStore> TenantRepository<S> {
    pub fn authorizer(&self) -> &Authorizer<S> {
        &self.authorizer
    }

    /// Operations on behalf of `principal`.
    pub fn scoped<'a>(&'a self, principal: &'a Principal) -> ScopedRepository<'a, S> {
        ScopedRepository {
            repo: self,
            principal,
        }
    }
}

/// The repository bound to one caller for the duration of a request.
pub struct ScopedRepository<'a, S> {
    repo: &'a TenantRepository<S>,
    principal: &'a Principal,
}

impl<S: DataStore> ScopedRepository<'_, S> {
    pub fn principal(&self) -> &Principal {
        self.principal
    }

    fn store(&self) -> &S {
        &self.repo.store
    }

    /// Locate and authorize; returns the owning organization.
    async fn require(
        &self,
        action: Action,
        resource: ResourceRef,
    ) -> RepositoryResult<OrganizationId> {
        Ok(self.repo.authorizer.require(self.principal, action, resource).await?)
    }

    /// Authorize against a known owner (or none).
    fn check(&self, action: Action, target: Option<OrganizationId>) -> RepositoryResult<()> {
        decide(self.principal, action, target).into_result().map_err(|_| {
            tracing::warn!(
                user_id = %self.principal.user_id(),
                %action,
                target = ?target,
                "access denied"
            );
            RepositoryError::Forbidden
        })
    }

    /// Scope for a list operation, optionally narrowed to one organization.
    async fn list_scope(&self, organization: Option<OrganizationId>) -> RepositoryResult<Scope> {
        match organization {
            Some(org) => {
                self.require(Action::List, org.into()).await?;
                Ok(Scope::Organization(org))
            }
            None => Ok(self.principal.scope()),
        }
    }

    /// Error for a row that vanished or was never visible.
    fn missing(&self, what: impl ToString) -> RepositoryError {
        if self.principal.is_superadmin() {
            RepositoryError::NotFound(what.to_string())
        } else {
            RepositoryError::Forbidden
        }
    }

    fn found<T>(&self, row: Option<T>, resource: ResourceRef) -> RepositoryResult<T> {
        row.ok_or_else(|| self.missing(resource))
    }
}
