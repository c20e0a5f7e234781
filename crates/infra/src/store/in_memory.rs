use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

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

use super::r#trait::{DataStore, StoreError, StoreTransaction};

/// Serial id generator. Like a database sequence, values consumed by a
/// rolled-back transaction are not reused.
#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct Sequences {
    organizations: Sequence,
    users: Sequence,
    customers: Sequence,
    sites: Sequence,
    site_contacts: Sequence,
    vendors: Sequence,
    units: Sequence,
    items: Sequence,
}

#[derive(Debug, Default)]
struct Tables {
    seq: Sequences,
    organizations: BTreeMap<OrganizationId, Organization>,
    users: BTreeMap<UserId, User>,
    customers: BTreeMap<CustomerId, Customer>,
    sites: BTreeMap<SiteId, ConstructionSite>,
    site_contacts: BTreeMap<SiteContactId, SiteContact>,
    vendors: BTreeMap<VendorId, Vendor>,
    units: BTreeMap<UnitId, Unit>,
    items: BTreeMap<ItemId, Item>,
}

impl Tables {
    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|u| u.username == username)
    }

    fn require_organization(&self, id: OrganizationId) -> Result<(), StoreError> {
        if self.organizations.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::DanglingReference(format!("organization {id}")))
        }
    }
}

fn user_row(id: UserId, new: NewUser) -> User {
    User {
        id,
        username: new.username,
        password_hash: new.password_hash,
        email: new.email,
        role: new.role,
        designation: new.designation,
        contact_number: new.contact_number,
        organization_id: new.organization_id,
        department: new.department,
        created_at: Utc::now(),
    }
}

fn scoped<'a, T, F>(rows: impl Iterator<Item = &'a T>, scope: Scope, owner: F) -> Vec<T>
where
    T: Clone + 'a,
    F: Fn(&T) -> OrganizationId,
{
    rows.filter(|row| scope.includes(owner(*row))).cloned().collect()
}

/// In-memory data store.
///
/// Intended for tests/dev. Enforces the same uniqueness and foreign-key
/// constraints as the PostgreSQL schema. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn get_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        Ok(self.read()?.organizations.get(&id).cloned())
    }

    async fn list_organizations(&self, scope: Scope) -> Result<Vec<Organization>, StoreError> {
        Ok(scoped(self.read()?.organizations.values(), scope, |o| o.id))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        Ok(Box::new(InMemoryTransaction {
            tables: Arc::clone(&self.tables),
            organizations: Vec::new(),
            users: Vec::new(),
        }))
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.write()?;
        if t.username_taken(&new.username) {
            return Err(StoreError::Conflict(format!("username '{}'", new.username)));
        }
        if let Some(org) = new.organization_id {
            t.require_organization(org)?;
        }
        let user = user_row(UserId::new(t.seq.users.next()), new);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|u| match (scope, u.organization_id) {
                (Scope::Unrestricted, _) => true,
                (Scope::Organization(want), Some(org)) => want == org,
                (Scope::Organization(_), None) => false,
            })
            .cloned()
            .collect())
    }

    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let mut t = self.write()?;
        t.require_organization(new.organization_id)?;
        let customer = Customer {
            id: CustomerId::new(t.seq.customers.next()),
            organization_id: new.organization_id,
            name: new.name,
            address: new.address,
            contact: new.contact,
            created_at: Utc::now(),
        };
        t.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    async fn list_customers(&self, scope: Scope) -> Result<Vec<Customer>, StoreError> {
        Ok(scoped(self.read()?.customers.values(), scope, |c| c.organization_id))
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, StoreError> {
        let mut t = self.write()?;
        Ok(t.customers.get_mut(&id).map(|customer| {
            update.apply(customer);
            customer.clone()
        }))
    }

    async fn create_site(&self, new: NewSite) -> Result<ConstructionSite, StoreError> {
        let mut t = self.write()?;
        if !t.customers.contains_key(&new.customer_id) {
            return Err(StoreError::DanglingReference(format!("customer {}", new.customer_id)));
        }
        let site = ConstructionSite {
            id: SiteId::new(t.seq.sites.next()),
            customer_id: new.customer_id,
            site_name: new.site_name,
            street_name: new.street_name,
            area: new.area,
            city: new.city,
            map_location: new.map_location,
            created_at: Utc::now(),
        };
        t.sites.insert(site.id, site.clone());
        Ok(site)
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<ConstructionSite>, StoreError> {
        Ok(self.read()?.sites.get(&id).cloned())
    }

    async fn list_sites(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<ConstructionSite>, StoreError> {
        Ok(self
            .read()?
            .sites
            .values()
            .filter(|s| s.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn update_site(
        &self,
        id: SiteId,
        update: SiteUpdate,
    ) -> Result<Option<ConstructionSite>, StoreError> {
        let mut t = self.write()?;
        Ok(t.sites.get_mut(&id).map(|site| {
            update.apply(site);
            site.clone()
        }))
    }

    async fn create_site_contact(&self, new: NewSiteContact) -> Result<SiteContact, StoreError> {
        let mut t = self.write()?;
        if !t.sites.contains_key(&new.site_id) {
            return Err(StoreError::DanglingReference(format!("construction site {}", new.site_id)));
        }
        let contact = SiteContact {
            id: SiteContactId::new(t.seq.site_contacts.next()),
            site_id: new.site_id,
            name: new.name,
            number: new.number,
            designation: new.designation,
            email: new.email,
            phone: new.phone,
            created_at: Utc::now(),
        };
        t.site_contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn get_site_contact(&self, id: SiteContactId) -> Result<Option<SiteContact>, StoreError> {
        Ok(self.read()?.site_contacts.get(&id).cloned())
    }

    async fn list_site_contacts(&self, site_id: SiteId) -> Result<Vec<SiteContact>, StoreError> {
        Ok(self
            .read()?
            .site_contacts
            .values()
            .filter(|c| c.site_id == site_id)
            .cloned()
            .collect())
    }

    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, StoreError> {
        let mut t = self.write()?;
        t.require_organization(new.organization_id)?;
        let vendor = Vendor {
            id: VendorId::new(t.seq.vendors.next()),
            organization_id: new.organization_id,
            name: new.name,
            address: new.address,
            contact: new.contact,
            created_at: Utc::now(),
        };
        t.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError> {
        Ok(self.read()?.vendors.get(&id).cloned())
    }

    async fn list_vendors(&self, scope: Scope) -> Result<Vec<Vendor>, StoreError> {
        Ok(scoped(self.read()?.vendors.values(), scope, |v| v.organization_id))
    }

    async fn update_vendor(
        &self,
        id: VendorId,
        update: VendorUpdate,
    ) -> Result<Option<Vendor>, StoreError> {
        let mut t = self.write()?;
        Ok(t.vendors.get_mut(&id).map(|vendor| {
            update.apply(vendor);
            vendor.clone()
        }))
    }

    async fn create_unit(&self, new: NewUnit) -> Result<Unit, StoreError> {
        let mut t = self.write()?;
        t.require_organization(new.organization_id)?;
        let unit = Unit {
            id: UnitId::new(t.seq.units.next()),
            organization_id: new.organization_id,
            name: new.name,
            created_at: Utc::now(),
        };
        t.units.insert(unit.id, unit.clone());
        Ok(unit)
    }

    async fn get_unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError> {
        Ok(self.read()?.units.get(&id).cloned())
    }

    async fn list_units(&self, scope: Scope) -> Result<Vec<Unit>, StoreError> {
        Ok(scoped(self.read()?.units.values(), scope, |u| u.organization_id))
    }

    async fn create_item(&self, new: NewItem) -> Result<Item, StoreError> {
        let mut t = self.write()?;
        t.require_organization(new.organization_id)?;
        if let Some(unit_id) = new.unit_id {
            if !t.units.contains_key(&unit_id) {
                return Err(StoreError::DanglingReference(format!("unit {unit_id}")));
            }
        }
        let item = Item {
            id: ItemId::new(t.seq.items.next()),
            organization_id: new.organization_id,
            name: new.name,
            kind: new.kind,
            unit_id: new.unit_id,
            purchase_price: new.purchase_price,
            sale_price: new.sale_price,
            associated_goods: new.associated_goods,
            created_at: Utc::now(),
        };
        t.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn list_items(&self, scope: Scope) -> Result<Vec<Item>, StoreError> {
        Ok(scoped(self.read()?.items.values(), scope, |i| i.organization_id))
    }

    async fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<Option<Item>, StoreError> {
        let mut t = self.write()?;
        if let Some(unit_id) = update.unit_id {
            if !t.units.contains_key(&unit_id) {
                return Err(StoreError::DanglingReference(format!("unit {unit_id}")));
            }
        }
        Ok(t.items.get_mut(&id).map(|item| {
            update.apply(item);
            item.clone()
        }))
    }
}

/// Transaction over `InMemoryDataStore`.
///
/// Ids are reserved eagerly; rows are staged locally and applied under a
/// single write lock at commit, so readers never see a partial result.
#[derive(Debug)]
pub struct InMemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    organizations: Vec<Organization>,
    users: Vec<User>,
}

impl InMemoryTransaction {
    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn staged_username(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }

    fn staged_organization(&self, id: OrganizationId) -> bool {
        self.organizations.iter().any(|o| o.id == id)
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn insert_organization(
        &mut self,
        new: NewOrganization,
    ) -> Result<Organization, StoreError> {
        let id = OrganizationId::new(self.write()?.seq.organizations.next());
        let organization = Organization {
            id,
            name: new.name,
            address: new.address,
            contact: new.contact,
            created_at: Utc::now(),
        };
        self.organizations.push(organization.clone());
        Ok(organization)
    }

    async fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        let id = {
            let mut t = self.write()?;
            if t.username_taken(&new.username) || self.staged_username(&new.username) {
                return Err(StoreError::Conflict(format!("username '{}'", new.username)));
            }
            if let Some(org) = new.organization_id {
                if !self.staged_organization(org) {
                    t.require_organization(org)?;
                }
            }
            UserId::new(t.seq.users.next())
        };

        let user = user_row(id, new);
        self.users.push(user.clone());
        Ok(user)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        let mut t = this
            .tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        // Usernames may have been taken since they were staged.
        for user in &this.users {
            if t.username_taken(&user.username) {
                return Err(StoreError::Conflict(format!("username '{}'", user.username)));
            }
        }

        for organization in this.organizations {
            t.organizations.insert(organization.id, organization);
        }
        for user in this.users {
            t.users.insert(user.id, user);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
