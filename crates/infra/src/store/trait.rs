use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use siteerp_auth::{NewUser, Scope, User};
use siteerp_core::{
    CustomerId, ItemId, OrganizationId, SiteContactId, SiteId, UnitId, UserId, VendorId,
};
use siteerp_inventory::{Item, ItemUpdate, NewItem, NewUnit, Unit};
use siteerp_parties::{
    ConstructionSite, Customer, CustomerUpdate, NewCustomer, NewSite, NewSiteContact, NewVendor,
    SiteContact, SiteUpdate, Vendor, VendorUpdate,
};
use siteerp_tenancy::{NewOrganization, Organization};

/// Data store operation error.
///
/// These are **infrastructure errors**. Authorization and payload validation
/// happen before a store is reached; a store only reports what the storage
/// itself refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist.
    #[error("dangling reference: {0}")]
    DanglingReference(String),

    /// The transaction was already finished or the row vanished mid-operation.
    #[error("not found: {0}")]
    NotFound(String),

    /// Connection, pool or decoding failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Raw, unscoped data access for every tenant-owned entity.
///
/// Implementations never authorize: callers go through the tenant-scoped
/// repository, which decides first and only then delegates here.
///
/// `get_*` returns `Ok(None)` for a missing row; `update_*` likewise returns
/// `Ok(None)` when the target does not exist. `list_*` filters by `Scope`
/// (`Scope::Unrestricted` returns every row) and orders by id.
#[async_trait]
pub trait DataStore: Send + Sync {
    // organizations
    async fn get_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError>;
    async fn list_organizations(&self, scope: Scope) -> Result<Vec<Organization>, StoreError>;

    /// Start a transaction for writes that must succeed or fail together.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;

    // users
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, StoreError>;

    // customers
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError>;
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn list_customers(&self, scope: Scope) -> Result<Vec<Customer>, StoreError>;
    async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, StoreError>;

    // construction sites
    async fn create_site(&self, new: NewSite) -> Result<ConstructionSite, StoreError>;
    async fn get_site(&self, id: SiteId) -> Result<Option<ConstructionSite>, StoreError>;
    async fn list_sites(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<ConstructionSite>, StoreError>;
    async fn update_site(
        &self,
        id: SiteId,
        update: SiteUpdate,
    ) -> Result<Option<ConstructionSite>, StoreError>;

    // site contacts
    async fn create_site_contact(&self, new: NewSiteContact) -> Result<SiteContact, StoreError>;
    async fn get_site_contact(&self, id: SiteContactId) -> Result<Option<SiteContact>, StoreError>;
    async fn list_site_contacts(&self, site_id: SiteId) -> Result<Vec<SiteContact>, StoreError>;

    // vendors
    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, StoreError>;
    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError>;
    async fn list_vendors(&self, scope: Scope) -> Result<Vec<Vendor>, StoreError>;
    async fn update_vendor(
        &self,
        id: VendorId,
        update: VendorUpdate,
    ) -> Result<Option<Vendor>, StoreError>;

    // units
    async fn create_unit(&self, new: NewUnit) -> Result<Unit, StoreError>;
    async fn get_unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError>;
    async fn list_units(&self, scope: Scope) -> Result<Vec<Unit>, StoreError>;

    // items
    async fn create_item(&self, new: NewItem) -> Result<Item, StoreError>;
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;
    async fn list_items(&self, scope: Scope) -> Result<Vec<Item>, StoreError>;
    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Option<Item>, StoreError>;
}

/// An open store transaction.
///
/// Writes staged through a transaction become visible to other callers only
/// after `commit`. Dropping a transaction without committing discards it.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn insert_organization(
        &mut self,
        new: NewOrganization,
    ) -> Result<Organization, StoreError>;
    async fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> DataStore for Arc<S>
where
    S: DataStore + ?Sized,
{
    async fn get_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        (**self).get_organization(id).await
    }

    async fn list_organizations(&self, scope: Scope) -> Result<Vec<Organization>, StoreError> {
        (**self).list_organizations(scope).await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        (**self).begin().await
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        (**self).create_user(new).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get_user(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).find_user_by_username(username).await
    }

    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, StoreError> {
        (**self).list_users(scope).await
    }

    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        (**self).create_customer(new).await
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        (**self).get_customer(id).await
    }

    async fn list_customers(&self, scope: Scope) -> Result<Vec<Customer>, StoreError> {
        (**self).list_customers(scope).await
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, StoreError> {
        (**self).update_customer(id, update).await
    }

    async fn create_site(&self, new: NewSite) -> Result<ConstructionSite, StoreError> {
        (**self).create_site(new).await
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<ConstructionSite>, StoreError> {
        (**self).get_site(id).await
    }

    async fn list_sites(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<ConstructionSite>, StoreError> {
        (**self).list_sites(customer_id).await
    }

    async fn update_site(
        &self,
        id: SiteId,
        update: SiteUpdate,
    ) -> Result<Option<ConstructionSite>, StoreError> {
        (**self).update_site(id, update).await
    }

    async fn create_site_contact(&self, new: NewSiteContact) -> Result<SiteContact, StoreError> {
        (**self).create_site_contact(new).await
    }

    async fn get_site_contact(&self, id: SiteContactId) -> Result<Option<SiteContact>, StoreError> {
        (**self).get_site_contact(id).await
    }

    async fn list_site_contacts(&self, site_id: SiteId) -> Result<Vec<SiteContact>, StoreError> {
        (**self).list_site_contacts(site_id).await
    }

    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, StoreError> {
        (**self).create_vendor(new).await
    }

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError> {
        (**self).get_vendor(id).await
    }

    async fn list_vendors(&self, scope: Scope) -> Result<Vec<Vendor>, StoreError> {
        (**self).list_vendors(scope).await
    }

    async fn update_vendor(
        &self,
        id: VendorId,
        update: VendorUpdate,
    ) -> Result<Option<Vendor>, StoreError> {
        (**self).update_vendor(id, update).await
    }

    async fn create_unit(&self, new: NewUnit) -> Result<Unit, StoreError> {
        (**self).create_unit(new).await
    }

    async fn get_unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError> {
        (**self).get_unit(id).await
    }

    async fn list_units(&self, scope: Scope) -> Result<Vec<Unit>, StoreError> {
        (**self).list_units(scope).await
    }

    async fn create_item(&self, new: NewItem) -> Result<Item, StoreError> {
        (**self).create_item(new).await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get_item(id).await
    }

    async fn list_items(&self, scope: Scope) -> Result<Vec<Item>, StoreError> {
        (**self).list_items(scope).await
    }

    async fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<Option<Item>, StoreError> {
        (**self).update_item(id, update).await
    }
}
