//! Resource locator: which organization owns a resource.
//!
//! Vendors, units, items and customers carry their organization directly.
//! Construction sites and site contacts are reached through their parents:
//!
//! ```text
//! site contact -> construction site -> customer -> organization
//! ```
//!
//! The walk is one loop over owner-or-parent steps so every route resolves
//! ownership the same way.

use thiserror::Error;
use tracing::instrument;

use siteerp_core::{OrganizationId, ResourceRef};

use crate::store::{DataStore, StoreError};

/// Longest ownership chain the locator follows before giving up.
pub const MAX_OWNERSHIP_HOPS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// The resource, or a row on its ownership chain, does not exist.
    #[error("{0} not found")]
    NotFound(ResourceRef),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One step of the ownership walk.
enum Step {
    Owner(OrganizationId),
    Parent(ResourceRef),
}

#[derive(Debug, Clone)]
pub struct ResourceLocator<S> {
    store: S,
}

impl<S: DataStore> ResourceLocator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Owning organization of `resource`, after checking that it and every
    /// parent on the way exist.
    #[instrument(skip(self), fields(resource = %resource), err)]
    pub async fn locate(&self, resource: ResourceRef) -> Result<OrganizationId, LocateError> {
        let mut current = resource;
        for _ in 0..MAX_OWNERSHIP_HOPS {
            match self.step(current).await? {
                Some(Step::Owner(org)) => return Ok(org),
                Some(Step::Parent(parent)) => current = parent,
                None => return Err(LocateError::NotFound(resource)),
            }
        }
        tracing::warn!(%resource, "ownership chain exceeds {MAX_OWNERSHIP_HOPS} hops");
        Err(LocateError::NotFound(resource))
    }

    async fn step(&self, resource: ResourceRef) -> Result<Option<Step>, StoreError> {
        let step = match resource {
            ResourceRef::Organization(id) => self
                .store
                .get_organization(id)
                .await?
                .map(|o| Step::Owner(o.id)),
            ResourceRef::Customer(id) => self
                .store
                .get_customer(id)
                .await?
                .map(|c| Step::Owner(c.organization_id)),
            ResourceRef::ConstructionSite(id) => self
                .store
                .get_site(id)
                .await?
                .map(|s| Step::Parent(s.customer_id.into())),
            ResourceRef::SiteContact(id) => self
                .store
                .get_site_contact(id)
                .await?
                .map(|c| Step::Parent(c.site_id.into())),
            ResourceRef::Vendor(id) => self
                .store
                .get_vendor(id)
                .await?
                .map(|v| Step::Owner(v.organization_id)),
            ResourceRef::Unit(id) => self
                .store
                .get_unit(id)
                .await?
                .map(|u| Step::Owner(u.organization_id)),
            ResourceRef::Item(id) => self
                .store
                .get_item(id)
                .await?
                .map(|i| Step::Owner(i.organization_id)),
        };
        Ok(step)
    }
}
