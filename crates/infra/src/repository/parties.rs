//! Customers, construction sites, site contacts and vendors.

use tracing::instrument;

use siteerp_auth::Action;
use siteerp_core::{CustomerId, OrganizationId, SiteContactId, SiteId, VendorId};
use siteerp_parties::{
    ConstructionSite, Customer, CustomerUpdate, NewCustomer, NewSite, NewSiteContact, NewVendor,
    SiteContact, SiteUpdate, Vendor, VendorUpdate,
};

use super::{RepositoryResult, ScopedRepository};
use crate::store::DataStore;

impl<S: DataStore> ScopedRepository<'_, S> {
    // ── customers ────────────────────────────────────────────────────────────

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    pub async fn create_customer(&self, new: NewCustomer) -> RepositoryResult<Customer> {
        new.validate()?;
        self.require(Action::Create, new.organization_id.into()).await?;
        Ok(self.store().create_customer(new).await?)
    }

    pub async fn get_customer(&self, id: CustomerId) -> RepositoryResult<Customer> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_customer(id).await?;
        self.found(row, id.into())
    }

    #[instrument(skip(self, update), fields(customer_id = %id), err)]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> RepositoryResult<Customer> {
        update.validate()?;
        self.require(Action::Update, id.into()).await?;
        let row = self.store().update_customer(id, update).await?;
        self.found(row, id.into())
    }

    /// Customers visible to the caller, optionally narrowed to one organization.
    pub async fn list_customers(
        &self,
        organization: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<Customer>> {
        let scope = self.list_scope(organization).await?;
        Ok(self.store().list_customers(scope).await?)
    }

    // ── construction sites ───────────────────────────────────────────────────

    #[instrument(skip(self, new), fields(customer_id = %new.customer_id), err)]
    pub async fn create_site(&self, new: NewSite) -> RepositoryResult<ConstructionSite> {
        new.validate()?;
        self.require(Action::Create, new.customer_id.into()).await?;
        Ok(self.store().create_site(new).await?)
    }

    pub async fn get_site(&self, id: SiteId) -> RepositoryResult<ConstructionSite> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_site(id).await?;
        self.found(row, id.into())
    }

    #[instrument(skip(self, update), fields(site_id = %id), err)]
    pub async fn update_site(
        &self,
        id: SiteId,
        update: SiteUpdate,
    ) -> RepositoryResult<ConstructionSite> {
        update.validate()?;
        self.require(Action::Update, id.into()).await?;
        let row = self.store().update_site(id, update).await?;
        self.found(row, id.into())
    }

    /// Sites of one customer.
    pub async fn list_sites(
        &self,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<ConstructionSite>> {
        self.require(Action::List, customer_id.into()).await?;
        Ok(self.store().list_sites(customer_id).await?)
    }

    // ── site contacts ────────────────────────────────────────────────────────

    #[instrument(skip(self, new), fields(site_id = %new.site_id), err)]
    pub async fn create_site_contact(&self, new: NewSiteContact) -> RepositoryResult<SiteContact> {
        new.validate()?;
        self.require(Action::Create, new.site_id.into()).await?;
        Ok(self.store().create_site_contact(new).await?)
    }

    pub async fn get_site_contact(&self, id: SiteContactId) -> RepositoryResult<SiteContact> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_site_contact(id).await?;
        self.found(row, id.into())
    }

    pub async fn list_site_contacts(&self, site_id: SiteId) -> RepositoryResult<Vec<SiteContact>> {
        self.require(Action::List, site_id.into()).await?;
        Ok(self.store().list_site_contacts(site_id).await?)
    }

    // ── vendors ──────────────────────────────────────────────────────────────

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    pub async fn create_vendor(&self, new: NewVendor) -> RepositoryResult<Vendor> {
        new.validate()?;
        self.require(Action::Create, new.organization_id.into()).await?;
        Ok(self.store().create_vendor(new).await?)
    }

    pub async fn get_vendor(&self, id: VendorId) -> RepositoryResult<Vendor> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_vendor(id).await?;
        self.found(row, id.into())
    }

    pub async fn update_vendor(
        &self,
        id: VendorId,
        update: VendorUpdate,
    ) -> RepositoryResult<Vendor> {
        update.validate()?;
        self.require(Action::Update, id.into()).await?;
        let row = self.store().update_vendor(id, update).await?;
        self.found(row, id.into())
    }

    pub async fn list_vendors(
        &self,
        organization: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<Vendor>> {
        let scope = self.list_scope(organization).await?;
        Ok(self.store().list_vendors(scope).await?)
    }
}
