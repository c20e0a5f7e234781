//! Organizations and user accounts.

use serde::Serialize;
use tracing::instrument;

use siteerp_auth::{Action, CreateUser, Role, User};
use siteerp_core::{DomainError, OrganizationId, UserId};
use siteerp_tenancy::{Organization, OrganizationSetup};

use super::{RepositoryError, RepositoryResult, ScopedRepository};
use crate::store::{DataStore, StoreError, StoreTransaction};

/// Result of creating an organization together with its first admin.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationWithAdmin {
    pub organization: Organization,
    pub admin: User,
}

impl<S: DataStore> ScopedRepository<'_, S> {
    /// Create an organization and its initial admin in one transaction.
    ///
    /// Either both rows become visible or neither does. A username that is
    /// already taken is reported as a validation error on `admin.username`.
    #[instrument(skip(self, setup), fields(user_id = %self.principal.user_id()), err)]
    pub async fn create_organization_with_admin(
        &self,
        setup: OrganizationSetup,
    ) -> RepositoryResult<OrganizationWithAdmin> {
        setup.validate()?;
        self.check(Action::Create, None)?;

        let OrganizationSetup { organization, admin } = setup;
        let password_hash = self.repo.credentials.hash(&admin.password)?;

        let mut tx = self.store().begin().await?;

        let organization = match tx.insert_organization(organization).await {
            Ok(o) => o,
            Err(e) => {
                abandon(tx).await;
                return Err(RepositoryError::TransactionFailure(e.to_string()));
            }
        };

        let new_admin = CreateUser {
            role: Role::Admin,
            organization_id: Some(organization.id),
            ..admin
        }
        .into_new_user(password_hash);

        let admin = match tx.insert_user(new_admin).await {
            Ok(u) => u,
            Err(e) => {
                abandon(tx).await;
                return Err(admin_write_error(e));
            }
        };

        tx.commit().await.map_err(admin_write_error)?;

        tracing::info!(
            organization_id = %organization.id,
            admin_id = %admin.id,
            "organization created"
        );
        Ok(OrganizationWithAdmin { organization, admin })
    }

    /// Every organization; superadmin only.
    pub async fn list_organizations(&self) -> RepositoryResult<Vec<Organization>> {
        self.check(Action::List, None)?;
        Ok(self.store().list_organizations(self.principal.scope()).await?)
    }

    pub async fn get_organization(&self, id: OrganizationId) -> RepositoryResult<Organization> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_organization(id).await?;
        self.found(row, id.into())
    }

    /// Create an account. Members may only add accounts to their own
    /// organization; only a superadmin may create another superadmin.
    #[instrument(
        skip(self, create),
        fields(user_id = %self.principal.user_id(), role = %create.role),
        err
    )]
    pub async fn create_user(&self, create: CreateUser) -> RepositoryResult<User> {
        create.validate()?;
        match create.organization_id {
            Some(org) => {
                self.require(Action::Create, org.into()).await?;
            }
            None => self.check(Action::Create, None)?,
        }

        let password_hash = self.repo.credentials.hash(&create.password)?;
        let user = self
            .store()
            .create_user(create.into_new_user(password_hash))
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    DomainError::validation("username", "already taken").into()
                }
                other => RepositoryError::Store(other),
            })?;

        tracing::info!(
            new_user_id = %user.id,
            organization_id = ?user.organization_id,
            "user created"
        );
        Ok(user)
    }

    /// A user account. Users are identity rows rather than tenant resources:
    /// the row is read to learn its organization, then the usual rules apply.
    pub async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        let Some(user) = self.store().get_user(id).await? else {
            return Err(self.missing(format!("user #{id}")));
        };
        self.check(Action::Read, user.organization_id)
            .map_err(|_| self.missing(format!("user #{id}")))?;
        Ok(user)
    }

    pub async fn list_users(
        &self,
        organization: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<User>> {
        let scope = self.list_scope(organization).await?;
        Ok(self.store().list_users(scope).await?)
    }

    /// The account behind the current principal.
    pub async fn current_user(&self) -> RepositoryResult<User> {
        let id = self.principal.user_id();
        self.store()
            .get_user(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("user #{id}")))
    }
}

async fn abandon(tx: Box<dyn StoreTransaction>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("rollback failed: {e}");
    }
}

fn admin_write_error(err: StoreError) -> RepositoryError {
    match err {
        StoreError::Conflict(_) => {
            DomainError::validation("admin.username", "already taken").into()
        }
        other => RepositoryError::TransactionFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use siteerp_auth::{NewUser, Principal, Scope};
    use siteerp_core::{CustomerId, ItemId, SiteContactId, SiteId, UnitId, VendorId};
    use siteerp_inventory::{Item, ItemUpdate, NewItem, NewUnit, Unit};
    use siteerp_parties::{
        ConstructionSite, Customer, CustomerUpdate, NewCustomer, NewSite, NewSiteContact, NewVendor,
        SiteContact, SiteUpdate, Vendor, VendorUpdate,
    };
    use siteerp_tenancy::NewOrganization;

    use super::super::TenantRepository;
    use super::super::test_support::*;
    use super::*;
    use crate::store::{DataStore, InMemoryDataStore};

    #[tokio::test]
    async fn superadmin_creates_organization_with_admin() {
        let repo = repository();
        let created = repo
            .scoped(&root())
            .create_organization_with_admin(setup("Acme Co", "acme_admin"))
            .await
            .unwrap();

        assert_eq!(created.organization.name, "Acme Co");
        assert_eq!(created.admin.username, "acme_admin");
        assert_eq!(created.admin.role, Role::Admin);
        assert_eq!(created.admin.organization_id, Some(created.organization.id));
        assert_ne!(created.admin.password_hash.as_str(), "password123");
    }

    #[tokio::test]
    async fn members_cannot_create_organizations() {
        let repo = repository();
        let org = organization(&repo, "Acme").await;
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            let p = Principal::member(UserId::new(5), role, org).unwrap();
            let err = p_create(&repo, &p, "Other", "other_admin").await;
            assert!(matches!(err, Err(RepositoryError::Forbidden)));
        }
        assert_eq!(repo.scoped(&root()).list_organizations().await.unwrap().len(), 1);
    }

    async fn p_create(
        repo: &TenantRepository<InMemoryDataStore>,
        p: &Principal,
        name: &str,
        admin: &str,
    ) -> RepositoryResult<OrganizationWithAdmin> {
        repo.scoped(p).create_organization_with_admin(setup(name, admin)).await
    }

    #[tokio::test]
    async fn failed_admin_creation_leaves_no_organization_behind() {
        let repo = repository();
        organization(&repo, "Acme").await;

        // "acme_admin" is taken, so the admin insert fails after the
        // organization insert already ran inside the transaction.
        let err = p_create(&repo, &root(), "Copycat", "acme_admin").await.unwrap_err();
        match err {
            RepositoryError::Validation(e) => assert_eq!(e.fields()[0].field, "admin.username"),
            other => panic!("unexpected error: {other:?}"),
        }

        let names: Vec<_> = repo
            .scoped(&root())
            .list_organizations()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["Acme"]);
    }

    #[tokio::test]
    async fn concurrent_creations_with_same_admin_yield_one_organization() {
        let repo = repository();
        let root = root();
        let a = repo.scoped(&root);
        let b = repo.scoped(&root);
        let (first, second) = tokio::join!(
            a.create_organization_with_admin(setup("First", "shared_admin")),
            b.create_organization_with_admin(setup("Second", "shared_admin")),
        );
        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);

        let orgs = repo.scoped(&root).list_organizations().await.unwrap();
        assert_eq!(orgs.len(), 1);
        let users = repo.store.list_users(siteerp_auth::Scope::Unrestricted).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].organization_id, Some(orgs[0].id));
    }

    #[tokio::test]
    async fn invalid_setup_is_rejected_before_any_write() {
        let repo = repository();
        let mut bad = setup("", "acme_admin");
        bad.admin.role = Role::Employee;
        let err = repo.scoped(&root()).create_organization_with_admin(bad).await.unwrap_err();
        let RepositoryError::Validation(e) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = e.fields().iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"organization.name"));
        assert!(fields.contains(&"admin.role"));
        assert!(repo.scoped(&root()).list_organizations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn organization_reads_follow_tenant_rules() {
        let repo = repository();
        let acme = organization(&repo, "Acme").await;
        let globex = organization(&repo, "Globex").await;

        let p = member(acme);
        assert_eq!(repo.scoped(&p).get_organization(acme).await.unwrap().id, acme);
        assert!(matches!(
            repo.scoped(&p).get_organization(globex).await,
            Err(RepositoryError::Forbidden)
        ));
        assert!(matches!(
            repo.scoped(&p).list_organizations().await,
            Err(RepositoryError::Forbidden)
        ));
        assert!(matches!(
            repo.scoped(&root()).get_organization(OrganizationId::new(404)).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn users_are_created_and_listed_within_the_tenant() {
        let repo = repository();
        let acme = organization(&repo, "Acme").await;
        let globex = organization(&repo, "Globex").await;
        let admin = Principal::member(UserId::new(2), Role::Admin, acme).unwrap();

        let mut create = setup("x", "site_manager").admin;
        create.role = Role::Manager;
        create.organization_id = Some(acme);
        let user = repo.scoped(&admin).create_user(create.clone()).await.unwrap();
        assert_eq!(user.organization_id, Some(acme));

        // duplicate username
        let err = repo.scoped(&admin).create_user(create.clone()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));

        // other tenant
        create.username = "intruder".into();
        create.organization_id = Some(globex);
        assert!(matches!(
            repo.scoped(&admin).create_user(create).await,
            Err(RepositoryError::Forbidden)
        ));

        let users = repo.scoped(&admin).list_users(None).await.unwrap();
        assert!(users.iter().all(|u| u.organization_id == Some(acme)));
        assert_eq!(repo.scoped(&admin).get_user(user.id).await.unwrap().id, user.id);

        let outsider = member(globex);
        assert!(matches!(
            repo.scoped(&outsider).get_user(user.id).await,
            Err(RepositoryError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn only_superadmin_creates_superadmins() {
        let repo = repository();
        let acme = organization(&repo, "Acme").await;
        let mut create = setup("x", "second_root").admin;
        create.role = Role::Superadmin;

        let admin = Principal::member(UserId::new(2), Role::Admin, acme).unwrap();
        assert!(matches!(
            repo.scoped(&admin).create_user(create.clone()).await,
            Err(RepositoryError::Forbidden)
        ));
        let created = repo.scoped(&root()).create_user(create).await.unwrap();
        assert_eq!(created.organization_id, None);
    }

    /// Where the flaky store's transactions break.
    #[derive(Debug, Clone, Copy)]
    enum FailAt {
        AdminInsert,
        Commit,
    }

    /// In-memory store whose transactions fail with a backend error.
    #[derive(Clone)]
    struct FlakyStore {
        inner: InMemoryDataStore,
        fail_at: FailAt,
    }

    struct FlakyTransaction {
        inner: Box<dyn StoreTransaction>,
        fail_at: FailAt,
    }

    #[async_trait]
    impl StoreTransaction for FlakyTransaction {
        async fn insert_organization(
            &mut self,
            new: NewOrganization,
        ) -> Result<Organization, StoreError> {
            self.inner.insert_organization(new).await
        }

        async fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError> {
            match self.fail_at {
                FailAt::AdminInsert => Err(StoreError::Backend("connection reset".into())),
                FailAt::Commit => self.inner.insert_user(new).await,
            }
        }

        async fn commit(self: Box<Self>) -> Result<(), StoreError> {
            match self.fail_at {
                FailAt::Commit => {
                    self.inner.rollback().await?;
                    Err(StoreError::Backend("commit lost".into()))
                }
                FailAt::AdminInsert => self.inner.commit().await,
            }
        }

        async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
            self.inner.rollback().await
        }
    }

    #[async_trait]
    impl DataStore for FlakyStore {
        async fn get_organization(
            &self,
            id: OrganizationId,
        ) -> Result<Option<Organization>, StoreError> {
            self.inner.get_organization(id).await
        }

        async fn list_organizations(&self, scope: Scope) -> Result<Vec<Organization>, StoreError> {
            self.inner.list_organizations(scope).await
        }

        async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
            Ok(Box::new(FlakyTransaction {
                inner: self.inner.begin().await?,
                fail_at: self.fail_at,
            }))
        }

        async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
            self.inner.create_user(new).await
        }

        async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
            self.inner.get_user(id).await
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
            self.inner.find_user_by_username(username).await
        }

        async fn list_users(&self, scope: Scope) -> Result<Vec<User>, StoreError> {
            self.inner.list_users(scope).await
        }

        async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
            self.inner.create_customer(new).await
        }

        async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
            self.inner.get_customer(id).await
        }

        async fn list_customers(&self, scope: Scope) -> Result<Vec<Customer>, StoreError> {
            self.inner.list_customers(scope).await
        }

        async fn update_customer(
            &self,
            id: CustomerId,
            update: CustomerUpdate,
        ) -> Result<Option<Customer>, StoreError> {
            self.inner.update_customer(id, update).await
        }

        async fn create_site(&self, new: NewSite) -> Result<ConstructionSite, StoreError> {
            self.inner.create_site(new).await
        }

        async fn get_site(&self, id: SiteId) -> Result<Option<ConstructionSite>, StoreError> {
            self.inner.get_site(id).await
        }

        async fn list_sites(
            &self,
            customer_id: CustomerId,
        ) -> Result<Vec<ConstructionSite>, StoreError> {
            self.inner.list_sites(customer_id).await
        }

        async fn update_site(
            &self,
            id: SiteId,
            update: SiteUpdate,
        ) -> Result<Option<ConstructionSite>, StoreError> {
            self.inner.update_site(id, update).await
        }

        async fn create_site_contact(
            &self,
            new: NewSiteContact,
        ) -> Result<SiteContact, StoreError> {
            self.inner.create_site_contact(new).await
        }

        async fn get_site_contact(
            &self,
            id: SiteContactId,
        ) -> Result<Option<SiteContact>, StoreError> {
            self.inner.get_site_contact(id).await
        }

        async fn list_site_contacts(
            &self,
            site_id: SiteId,
        ) -> Result<Vec<SiteContact>, StoreError> {
            self.inner.list_site_contacts(site_id).await
        }

        async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, StoreError> {
            self.inner.create_vendor(new).await
        }

        async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError> {
            self.inner.get_vendor(id).await
        }

        async fn list_vendors(&self, scope: Scope) -> Result<Vec<Vendor>, StoreError> {
            self.inner.list_vendors(scope).await
        }

        async fn update_vendor(
            &self,
            id: VendorId,
            update: VendorUpdate,
        ) -> Result<Option<Vendor>, StoreError> {
            self.inner.update_vendor(id, update).await
        }

        async fn create_unit(&self, new: NewUnit) -> Result<Unit, StoreError> {
            self.inner.create_unit(new).await
        }

        async fn get_unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError> {
            self.inner.get_unit(id).await
        }

        async fn list_units(&self, scope: Scope) -> Result<Vec<Unit>, StoreError> {
            self.inner.list_units(scope).await
        }

        async fn create_item(&self, new: NewItem) -> Result<Item, StoreError> {
            self.inner.create_item(new).await
        }

        async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
            self.inner.get_item(id).await
        }

        async fn list_items(&self, scope: Scope) -> Result<Vec<Item>, StoreError> {
            self.inner.list_items(scope).await
        }

        async fn update_item(
            &self,
            id: ItemId,
            update: ItemUpdate,
        ) -> Result<Option<Item>, StoreError> {
            self.inner.update_item(id, update).await
        }
}

    #[tokio::test]
    async fn store_failure_during_organization_creation_rolls_back() {
        for fail_at in [FailAt::AdminInsert, FailAt::Commit] {
            let repo = TenantRepository::new(
                FlakyStore {
                    inner: InMemoryDataStore::new(),
                    fail_at,
                },
                Arc::new(PlainHasher),
            );

            let err = p_create_in(&repo, "Acme Co", "acme_admin").await.unwrap_err();
            assert!(
                matches!(err, RepositoryError::TransactionFailure(_)),
                "{fail_at:?}: unexpected error {err:?}"
            );

            let root_ctx = root();
            let scoped = repo.scoped(&root_ctx);
            assert!(scoped.list_organizations().await.unwrap().is_empty(), "{fail_at:?}");
            assert!(scoped.list_users(None).await.unwrap().is_empty(), "{fail_at:?}");
        }
    }

    async fn p_create_in(
        repo: &TenantRepository<FlakyStore>,
        name: &str,
        admin: &str,
    ) -> RepositoryResult<OrganizationWithAdmin> {
        repo.scoped(&root()).create_organization_with_admin(setup(name, admin)).await
    }
}
