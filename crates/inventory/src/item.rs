use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siteerp_core::{
    DomainResult, Entity, ItemId, OrganizationId, OrganizationOwned, UnitId, Validator,
};

/// Item kind: a physical good or a billable service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Good,
    Service,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown item type '{0}'")]
pub struct UnknownItemKind(pub String);

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Good => "good",
            ItemKind::Service => "service",
        }
    }
}

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(ItemKind::Good),
            "service" => Ok(ItemKind::Service),
            other => Err(UnknownItemKind(other.to_string())),
        }
    }
}

/// Catalog item. Prices are integer minor units.
///
/// A service may list the goods it consumes (`associated_goods`); goods never
/// carry associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub unit_id: Option<UnitId>,
    pub purchase_price: Option<i64>,
    pub sale_price: Option<i64>,
    pub associated_goods: Vec<ItemId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

impl OrganizationOwned for Item {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    #[serde(default)]
    pub purchase_price: Option<i64>,
    #[serde(default)]
    pub sale_price: Option<i64>,
    #[serde(default)]
    pub associated_goods: Vec<ItemId>,
}

impl NewItem {
    /// Shape checks only. Whether the unit and associated goods exist in the
    /// same organization is checked against storage by the repository.
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.require_max_len("name", &self.name, 200)
            .optional_non_negative("purchasePrice", self.purchase_price)
            .optional_non_negative("salePrice", self.sale_price);
        check_associations(&mut v, self.kind, &self.associated_goods);
        v.finish()
    }
}

/// Partial update. Owner and kind are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    #[serde(default)]
    pub purchase_price: Option<i64>,
    #[serde(default)]
    pub sale_price: Option<i64>,
    #[serde(default)]
    pub associated_goods: Option<Vec<ItemId>>,
}

impl ItemUpdate {
    pub fn validate_for(&self, item: &Item) -> DomainResult<()> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.require_max_len("name", name, 200);
        }
        v.optional_non_negative("purchasePrice", self.purchase_price)
            .optional_non_negative("salePrice", self.sale_price);
        if let Some(goods) = &self.associated_goods {
            check_associations(&mut v, item.kind, goods);
            if goods.contains(&item.id) {
                v.reject("associatedGoods", "an item cannot be associated with itself");
            }
        }
        v.finish()
    }

    pub fn apply(self, item: &mut Item) {
        if let Some(v) = self.name {
            item.name = v;
        }
        if let Some(v) = self.unit_id {
            item.unit_id = Some(v);
        }
        if let Some(v) = self.purchase_price {
            item.purchase_price = Some(v);
        }
        if let Some(v) = self.sale_price {
            item.sale_price = Some(v);
        }
        if let Some(v) = self.associated_goods {
            item.associated_goods = v;
        }
    }
}

fn check_associations(v: &mut Validator, kind: ItemKind, goods: &[ItemId]) {
    if kind == ItemKind::Good && !goods.is_empty() {
        v.reject("associatedGoods", "only services can have associated goods");
    }
    let mut seen = HashSet::new();
    if goods.iter().any(|id| !seen.insert(*id)) {
        v.reject("associatedGoods", "contains duplicates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(kind: ItemKind, goods: Vec<i64>) -> NewItem {
        NewItem {
            organization_id: OrganizationId::new(1),
            name: "Concrete pour".into(),
            kind,
            unit_id: Some(UnitId::new(1)),
            purchase_price: Some(1_000),
            sale_price: Some(1_500),
            associated_goods: goods.into_iter().map(ItemId::new).collect(),
        }
    }

    #[test]
    fn kind_text_round_trips() {
        for kind in [ItemKind::Good, ItemKind::Service] {
            assert_eq!(kind.as_str().parse::<ItemKind>().unwrap(), kind);
        }
        assert!("bundle".parse::<ItemKind>().is_err());
    }

    #[test]
    fn parses_type_field() {
        let item: NewItem = serde_json::from_value(serde_json::json!({
            "organizationId": 1,
            "name": "Cement bag",
            "type": "good",
            "salePrice": 900
        }))
        .unwrap();
        assert_eq!(item.kind, ItemKind::Good);
        assert!(item.associated_goods.is_empty());
        assert!(item.validate().is_ok());
    }

    #[test]
    fn goods_cannot_have_associations() {
        let err = new_item(ItemKind::Good, vec![2]).validate().unwrap_err();
        assert_eq!(err.fields()[0].field, "associatedGoods");
        assert!(new_item(ItemKind::Service, vec![2, 3]).validate().is_ok());
    }

    #[test]
    fn duplicate_associations_are_rejected() {
        assert!(new_item(ItemKind::Service, vec![2, 2]).validate().is_err());
    }

    #[test]
    fn update_cannot_self_associate() {
        let item = Item {
            id: ItemId::new(7),
            organization_id: OrganizationId::new(1),
            name: "Plastering".into(),
            kind: ItemKind::Service,
            unit_id: None,
            purchase_price: None,
            sale_price: None,
            associated_goods: vec![],
            created_at: Utc::now(),
        };
        let update = ItemUpdate {
            associated_goods: Some(vec![ItemId::new(7)]),
            ..ItemUpdate::default()
        };
        assert!(update.validate_for(&item).is_err());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: negative prices never validate, non-negative ones always do.
            #[test]
            fn price_sign_decides_validity(
                purchase in -10_000i64..10_000,
                sale in -10_000i64..10_000
            ) {
                let mut item = new_item(ItemKind::Good, vec![]);
                item.purchase_price = Some(purchase);
                item.sale_price = Some(sale);
                prop_assert_eq!(item.validate().is_ok(), purchase >= 0 && sale >= 0);
            }
        }
    }
}
