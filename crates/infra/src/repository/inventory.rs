//! Units and items.

use tracing::instrument;

use siteerp_auth::Action;
use siteerp_core::{ItemId, OrganizationId, UnitId, Validator};
use siteerp_inventory::{Item, ItemKind, ItemUpdate, NewItem, NewUnit, Unit};

use super::{RepositoryResult, ScopedRepository};
use crate::store::DataStore;

impl<S: DataStore> ScopedRepository<'_, S> {
    // ── units ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    pub async fn create_unit(&self, new: NewUnit) -> RepositoryResult<Unit> {
        new.validate()?;
        self.require(Action::Create, new.organization_id.into()).await?;
        Ok(self.store().create_unit(new).await?)
    }

    pub async fn get_unit(&self, id: UnitId) -> RepositoryResult<Unit> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_unit(id).await?;
        self.found(row, id.into())
    }

    pub async fn list_units(
        &self,
        organization: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<Unit>> {
        let scope = self.list_scope(organization).await?;
        Ok(self.store().list_units(scope).await?)
    }

    // ── items ────────────────────────────────────────────────────────────────

    /// Create an item. Its unit and associated goods must belong to the same
    /// organization, and associated items must be goods.
    #[instrument(skip(self, new), fields(organization_id = %new.organization_id), err)]
    pub async fn create_item(&self, new: NewItem) -> RepositoryResult<Item> {
        new.validate()?;
        let org = self.require(Action::Create, new.organization_id.into()).await?;
        self.check_item_references(org, new.unit_id, &new.associated_goods)
            .await?;
        Ok(self.store().create_item(new).await?)
    }

    pub async fn get_item(&self, id: ItemId) -> RepositoryResult<Item> {
        self.require(Action::Read, id.into()).await?;
        let row = self.store().get_item(id).await?;
        self.found(row, id.into())
    }

    /// Update an item. The payload is checked against the stored item (kind,
    /// self-association), so validation follows the authorization step.
    #[instrument(skip(self, update), fields(item_id = %id), err)]
    pub async fn update_item(&self, id: ItemId, update: ItemUpdate) -> RepositoryResult<Item> {
        let org = self.require(Action::Update, id.into()).await?;
        let row = self.store().get_item(id).await?;
        let item = self.found(row, id.into())?;

        update.validate_for(&item)?;
        self.check_item_references(
            org,
            update.unit_id,
            update.associated_goods.as_deref().unwrap_or_default(),
        )
        .await?;

        let row = self.store().update_item(id, update).await?;
        self.found(row, id.into())
    }

    pub async fn list_items(
        &self,
        organization: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<Item>> {
        let scope = self.list_scope(organization).await?;
        Ok(self.store().list_items(scope).await?)
    }

    /// Unit and associated goods must exist in `org`. Rows of other tenants
    /// are reported exactly like missing ones.
    async fn check_item_references(
        &self,
        org: OrganizationId,
        unit_id: Option<UnitId>,
        associated_goods: &[ItemId],
    ) -> RepositoryResult<()> {
        let mut v = Validator::new();

        if let Some(unit_id) = unit_id {
            match self.store().get_unit(unit_id).await? {
                Some(unit) if unit.organization_id == org => {}
                _ => {
                    v.reject("unitId", format!("unknown unit {unit_id}"));
                }
            }
        }

        for good in associated_goods {
            match self.store().get_item(*good).await? {
                Some(item) if item.organization_id == org && item.kind == ItemKind::Good => {}
                Some(item) if item.organization_id == org => {
                    v.reject("associatedGoods", format!("item {good} is not a good"));
                }
                _ => {
                    v.reject("associatedGoods", format!("unknown item {good}"));
                }
            }
        }

        Ok(v.finish()?)
    }
}
