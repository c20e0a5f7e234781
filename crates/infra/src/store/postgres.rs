//! Postgres-backed data store.
//!
//! Row-level constraints (uniqueness, foreign keys, the role/organization
//! pairing of users) are enforced by the schema in `sql/schema.sql`.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate username |
//! | Database (foreign key violation) | `23503` | `DanglingReference` | Owner row missing |
//! | Database (check constraint violation) | `23514` | `Backend` | CHECK constraint failed |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | RowNotFound | N/A | `NotFound` | `RETURNING` produced no row |
//! | Other | N/A | `Backend` | Network errors, decode failures, etc. |
//!
//! ## Thread Safety
//!
//! `PostgresDataStore` is `Send + Sync` and cheap to clone; all clones share
//! one SQLx connection pool.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use siteerp_auth::{NewUser, PasswordHash, Role, Scope, User};
use siteerp_core::{
    CustomerId, ItemId, MapLocation, OrganizationId, PrimaryContact, SiteContactId, SiteId, UnitId,
    UserId, VendorId,
};
use siteerp_inventory::{Item, ItemKind, ItemUpdate, NewItem, NewUnit, Unit};
use siteerp_parties::{
    ConstructionSite, Customer, CustomerUpdate, NewCustomer, NewSite, NewSiteContact, NewVendor,
    SiteContact, SiteUpdate, Vendor, VendorUpdate,
};
use siteerp_tenancy::{NewOrganization, Organization};

use super::r#trait::{DataStore, StoreError, StoreTransaction};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

const INSERT_ORGANIZATION: &str = r#"
    INSERT INTO organizations (
        name, address, primary_contact_name, primary_contact_number,
        designation, primary_email, primary_phone
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (
        username, password_hash, email, role, designation,
        contact_number, organization_id, department
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING *
"#;

/// Postgres-backed data store.
#[derive(Debug, Clone)]
pub struct PostgresDataStore {
    pool: Arc<PgPool>,
}

impl PostgresDataStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn from_arc(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for PostgresDataStore {
    #[instrument(skip(self), fields(organization_id = %id), err)]
    async fn get_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        let row = sqlx::query("SELECT * FROM organizations WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_organization", e))?;
        row.as_ref()
            .map(organization_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_organization", e))
    }

    #[instrument(skip(self), err)]
    async fn list_organizations(&self, scope: Scope) -> Result<Vec<Organization>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM organizations WHERE ($1::BIGINT IS NULL OR id = $1) ORDER BY id",
        )
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_organizations", e))?;
        decode_all("list_organizations", &rows, organization_from_row)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }

    #[instrument(skip(self, new), fields(username = %new.username), err)]
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let row = bind_user(sqlx::query(INSERT_USER), &new)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_user", e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error("create_user", e))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_user", e))
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_user_by_username", e))
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self, scope: Scope) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM users WHERE ($1::BIGINT IS NULL OR organization_id = $1) ORDER BY id",
        )
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;
        decode_all("list_users", &rows, user_from_row)
    }

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (
                organization_id, name, address, primary_contact_name,
                primary_contact_number, designation, primary_email, primary_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.organization_id.get())
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.contact.name)
        .bind(&new.contact.number)
        .bind(&new.contact.designation)
        .bind(&new.contact.email)
        .bind(&new.contact.phone)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_customer", e))?;
        customer_from_row(&row).map_err(|e| map_sqlx_error("create_customer", e))
    }

    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_customer", e))?;
        row.as_ref()
            .map(customer_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_customer", e))
    }

    #[instrument(skip(self), err)]
    async fn list_customers(&self, scope: Scope) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM customers
            WHERE ($1::BIGINT IS NULL OR organization_id = $1)
            ORDER BY id
            "#,
        )
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;
        decode_all("list_customers", &rows, customer_from_row)
    }

    #[instrument(skip(self, update), fields(customer_id = %id), err)]
    async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, StoreError> {
        let contact = update.contact.as_ref();
        let row = sqlx::query(
            r#"
            UPDATE customers SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                primary_contact_name = COALESCE($4, primary_contact_name),
                primary_contact_number = COALESCE($5, primary_contact_number),
                designation = COALESCE($6, designation),
                primary_email = COALESCE($7, primary_email),
                primary_phone = COALESCE($8, primary_phone)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(update.name.as_deref())
        .bind(update.address.as_deref())
        .bind(contact.map(|c| c.name.as_str()))
        .bind(contact.map(|c| c.number.as_str()))
        .bind(contact.map(|c| c.designation.as_str()))
        .bind(contact.map(|c| c.email.as_str()))
        .bind(contact.map(|c| c.phone.as_str()))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;
        row.as_ref()
            .map(customer_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("update_customer", e))
    }

    #[instrument(skip(self, new), fields(customer_id = %new.customer_id), err)]
    async fn create_site(&self, new: NewSite) -> Result<ConstructionSite, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO construction_sites
                (customer_id, site_name, street_name, area, city, map_location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.customer_id.get())
        .bind(&new.site_name)
        .bind(&new.street_name)
        .bind(&new.area)
        .bind(&new.city)
        .bind(new.map_location.map(Json))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_site", e))?;
        site_from_row(&row).map_err(|e| map_sqlx_error("create_site", e))
    }

    #[instrument(skip(self), fields(site_id = %id), err)]
    async fn get_site(&self, id: SiteId) -> Result<Option<ConstructionSite>, StoreError> {
        let row = sqlx::query("SELECT * FROM construction_sites WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_site", e))?;
        row.as_ref()
            .map(site_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_site", e))
    }

    #[instrument(skip(self), fields(customer_id = %customer_id), err)]
    async fn list_sites(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<ConstructionSite>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM construction_sites WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_sites", e))?;
        decode_all("list_sites", &rows, site_from_row)
    }

    #[instrument(skip(self, update), fields(site_id = %id), err)]
    async fn update_site(
        &self,
        id: SiteId,
        update: SiteUpdate,
    ) -> Result<Option<ConstructionSite>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE construction_sites SET
                site_name = COALESCE($2, site_name),
                street_name = COALESCE($3, street_name),
                area = COALESCE($4, area),
                city = COALESCE($5, city),
                map_location = COALESCE($6, map_location)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(update.site_name.as_deref())
        .bind(update.street_name.as_deref())
        .bind(update.area.as_deref())
        .bind(update.city.as_deref())
        .bind(update.map_location.map(Json))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_site", e))?;
        row.as_ref()
            .map(site_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("update_site", e))
    }

    #[instrument(skip(self, new), fields(site_id = %new.site_id), err)]
    async fn create_site_contact(&self, new: NewSiteContact) -> Result<SiteContact, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO site_contacts (site_id, name, number, designation, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.site_id.get())
        .bind(&new.name)
        .bind(&new.number)
        .bind(&new.designation)
        .bind(&new.email)
        .bind(&new.phone)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_site_contact", e))?;
        site_contact_from_row(&row).map_err(|e| map_sqlx_error("create_site_contact", e))
    }

    #[instrument(skip(self), fields(site_contact_id = %id), err)]
    async fn get_site_contact(&self, id: SiteContactId) -> Result<Option<SiteContact>, StoreError> {
        let row = sqlx::query("SELECT * FROM site_contacts WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_site_contact", e))?;
        row.as_ref()
            .map(site_contact_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_site_contact", e))
    }

    #[instrument(skip(self), fields(site_id = %site_id), err)]
    async fn list_site_contacts(&self, site_id: SiteId) -> Result<Vec<SiteContact>, StoreError> {
        let rows = sqlx::query("SELECT * FROM site_contacts WHERE site_id = $1 ORDER BY id")
            .bind(site_id.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_site_contacts", e))?;
        decode_all("list_site_contacts", &rows, site_contact_from_row)
    }

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO vendors (
                organization_id, name, address, primary_contact_name,
                primary_contact_number, designation, primary_email, primary_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.organization_id.get())
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.contact.name)
        .bind(&new.contact.number)
        .bind(&new.contact.designation)
        .bind(&new.contact.email)
        .bind(&new.contact.phone)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_vendor", e))?;
        vendor_from_row(&row).map_err(|e| map_sqlx_error("create_vendor", e))
    }

    #[instrument(skip(self), fields(vendor_id = %id), err)]
    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query("SELECT * FROM vendors WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_vendor", e))?;
        row.as_ref()
            .map(vendor_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_vendor", e))
    }

    #[instrument(skip(self), err)]
    async fn list_vendors(&self, scope: Scope) -> Result<Vec<Vendor>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM vendors WHERE ($1::BIGINT IS NULL OR organization_id = $1) ORDER BY id",
        )
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_vendors", e))?;
        decode_all("list_vendors", &rows, vendor_from_row)
    }

    #[instrument(skip(self, update), fields(vendor_id = %id), err)]
    async fn update_vendor(
        &self,
        id: VendorId,
        update: VendorUpdate,
    ) -> Result<Option<Vendor>, StoreError> {
        let contact = update.contact.as_ref();
        let row = sqlx::query(
            r#"
            UPDATE vendors SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                primary_contact_name = COALESCE($4, primary_contact_name),
                primary_contact_number = COALESCE($5, primary_contact_number),
                designation = COALESCE($6, designation),
                primary_email = COALESCE($7, primary_email),
                primary_phone = COALESCE($8, primary_phone)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(update.name.as_deref())
        .bind(update.address.as_deref())
        .bind(contact.map(|c| c.name.as_str()))
        .bind(contact.map(|c| c.number.as_str()))
        .bind(contact.map(|c| c.designation.as_str()))
        .bind(contact.map(|c| c.email.as_str()))
        .bind(contact.map(|c| c.phone.as_str()))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_vendor", e))?;
        row.as_ref()
            .map(vendor_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("update_vendor", e))
    }

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    async fn create_unit(&self, new: NewUnit) -> Result<Unit, StoreError> {
        let row = sqlx::query(
            "INSERT INTO units (organization_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(new.organization_id.get())
        .bind(&new.name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_unit", e))?;
        unit_from_row(&row).map_err(|e| map_sqlx_error("create_unit", e))
    }

    #[instrument(skip(self), fields(unit_id = %id), err)]
    async fn get_unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError> {
        let row = sqlx::query("SELECT * FROM units WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_unit", e))?;
        row.as_ref()
            .map(unit_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_unit", e))
    }

    #[instrument(skip(self), err)]
    async fn list_units(&self, scope: Scope) -> Result<Vec<Unit>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM units WHERE ($1::BIGINT IS NULL OR organization_id = $1) ORDER BY id",
        )
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_units", e))?;
        decode_all("list_units", &rows, unit_from_row)
    }

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    async fn create_item(&self, new: NewItem) -> Result<Item, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO items (
                organization_id, name, type, unit_id,
                purchase_price, sale_price, associated_goods
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.organization_id.get())
        .bind(&new.name)
        .bind(new.kind.as_str())
        .bind(new.unit_id.map(UnitId::get))
        .bind(new.purchase_price)
        .bind(new.sale_price)
        .bind(Json(&new.associated_goods))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_item", e))?;
        item_from_row(&row).map_err(|e| map_sqlx_error("create_item", e))
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query("SELECT * FROM items WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?;
        row.as_ref()
            .map(item_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_item", e))
    }

    #[instrument(skip(self), err)]
    async fn list_items(&self, scope: Scope) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM items WHERE ($1::BIGINT IS NULL OR organization_id = $1) ORDER BY id",
        )
        .bind(scope_filter(scope))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;
        decode_all("list_items", &rows, item_from_row)
    }

    #[instrument(skip(self, update), fields(item_id = %id), err)]
    async fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                unit_id = COALESCE($3, unit_id),
                purchase_price = COALESCE($4, purchase_price),
                sale_price = COALESCE($5, sale_price),
                associated_goods = COALESCE($6, associated_goods)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(update.name.as_deref())
        .bind(update.unit_id.map(UnitId::get))
        .bind(update.purchase_price)
        .bind(update.sale_price)
        .bind(update.associated_goods.as_ref().map(Json))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;
        row.as_ref()
            .map(item_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("update_item", e))
    }
}

/// `sqlx` transaction behind `StoreTransaction`. Dropping it without
/// `commit` rolls back.
struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn insert_organization(
        &mut self,
        new: NewOrganization,
    ) -> Result<Organization, StoreError> {
        let row = sqlx::query(INSERT_ORGANIZATION)
            .bind(&new.name)
            .bind(&new.address)
            .bind(&new.contact.name)
            .bind(&new.contact.number)
            .bind(&new.contact.designation)
            .bind(&new.contact.email)
            .bind(&new.contact.phone)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_organization", e))?;
        organization_from_row(&row).map_err(|e| map_sqlx_error("insert_organization", e))
    }

    async fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        let row = bind_user(sqlx::query(INSERT_USER), &new)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error("insert_user", e))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding and row decoding
// ─────────────────────────────────────────────────────────────────────────────

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>;

fn bind_user<'q>(query: PgQuery<'q>, new: &'q NewUser) -> PgQuery<'q> {
    query
        .bind(&new.username)
        .bind(new.password_hash.as_str())
        .bind(&new.email)
        .bind(new.role.as_str())
        .bind(new.designation.as_deref())
        .bind(new.contact_number.as_deref())
        .bind(new.organization_id.map(OrganizationId::get))
        .bind(new.department.as_deref())
}

fn scope_filter(scope: Scope) -> Option<i64> {
    scope.organization_id().map(OrganizationId::get)
}

fn decode_all<T>(
    operation: &str,
    rows: &[PgRow],
    decode: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> Result<Vec<T>, StoreError> {
    rows.iter()
        .map(decode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sqlx_error(operation, e))
}

fn contact_from_row(row: &PgRow) -> Result<PrimaryContact, sqlx::Error> {
    Ok(PrimaryContact {
        name: row.try_get("primary_contact_name")?,
        number: row.try_get("primary_contact_number")?,
        designation: row.try_get("designation")?,
        email: row.try_get("primary_email")?,
        phone: row.try_get("primary_phone")?,
    })
}

fn organization_from_row(row: &PgRow) -> Result<Organization, sqlx::Error> {
    Ok(Organization {
        id: OrganizationId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        contact: contact_from_row(row)?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let organization_id: Option<i64> = row.try_get("organization_id")?;
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: PasswordHash::from_phc(row.try_get::<String, _>("password_hash")?),
        email: row.try_get("email")?,
        role: role
            .parse::<Role>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        designation: row.try_get("designation")?,
        contact_number: row.try_get("contact_number")?,
        organization_id: organization_id.map(OrganizationId::new),
        department: row.try_get("department")?,
        created_at: row.try_get("created_at")?,
    })
}

fn customer_from_row(row: &PgRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: CustomerId::new(row.try_get("id")?),
        organization_id: OrganizationId::new(row.try_get("organization_id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        contact: contact_from_row(row)?,
        created_at: row.try_get("created_at")?,
    })
}

fn site_from_row(row: &PgRow) -> Result<ConstructionSite, sqlx::Error> {
    let map_location: Option<Json<MapLocation>> = row.try_get("map_location")?;
    Ok(ConstructionSite {
        id: SiteId::new(row.try_get("id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        site_name: row.try_get("site_name")?,
        street_name: row.try_get("street_name")?,
        area: row.try_get("area")?,
        city: row.try_get("city")?,
        map_location: map_location.map(|Json(location)| location),
        created_at: row.try_get("created_at")?,
    })
}

fn site_contact_from_row(row: &PgRow) -> Result<SiteContact, sqlx::Error> {
    Ok(SiteContact {
        id: SiteContactId::new(row.try_get("id")?),
        site_id: SiteId::new(row.try_get("site_id")?),
        name: row.try_get("name")?,
        number: row.try_get("number")?,
        designation: row.try_get("designation")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
    })
}

fn vendor_from_row(row: &PgRow) -> Result<Vendor, sqlx::Error> {
    Ok(Vendor {
        id: VendorId::new(row.try_get("id")?),
        organization_id: OrganizationId::new(row.try_get("organization_id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        contact: contact_from_row(row)?,
        created_at: row.try_get("created_at")?,
    })
}

fn unit_from_row(row: &PgRow) -> Result<Unit, sqlx::Error> {
    Ok(Unit {
        id: UnitId::new(row.try_get("id")?),
        organization_id: OrganizationId::new(row.try_get("organization_id")?),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<Item, sqlx::Error> {
    let kind: String = row.try_get("type")?;
    let unit_id: Option<i64> = row.try_get("unit_id")?;
    let Json(associated_goods): Json<Vec<ItemId>> = row.try_get("associated_goods")?;
    Ok(Item {
        id: ItemId::new(row.try_get("id")?),
        organization_id: OrganizationId::new(row.try_get("organization_id")?),
        name: row.try_get("name")?,
        kind: kind
            .parse::<ItemKind>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        unit_id: unit_id.map(UnitId::new),
        purchase_price: row.try_get("purchase_price")?,
        sale_price: row.try_get("sale_price")?,
        associated_goods,
        created_at: row.try_get("created_at")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation
                Some("23505") => StoreError::Conflict(msg),
                // Foreign key violation
                Some("23503") => StoreError::DanglingReference(msg),
                // Check constraint violation
                Some("23514") => StoreError::Backend(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::NotFound(format!("no row returned in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
