//! References to tenant-owned resources, independent of their payloads.

use serde::Serialize;

use crate::id::{CustomerId, ItemId, OrganizationId, SiteContactId, SiteId, UnitId, VendorId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Organization,
    Customer,
    ConstructionSite,
    SiteContact,
    Vendor,
    Unit,
    Item,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Customer => "customer",
            Self::ConstructionSite => "construction_site",
            Self::SiteContact => "site_contact",
            Self::Vendor => "vendor",
            Self::Unit => "unit",
            Self::Item => "item",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specific resource, e.g. "customer #7".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Organization(OrganizationId),
    Customer(CustomerId),
    ConstructionSite(SiteId),
    SiteContact(SiteContactId),
    Vendor(VendorId),
    Unit(UnitId),
    Item(ItemId),
}

impl ResourceRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Organization(_) => ResourceKind::Organization,
            Self::Customer(_) => ResourceKind::Customer,
            Self::ConstructionSite(_) => ResourceKind::ConstructionSite,
            Self::SiteContact(_) => ResourceKind::SiteContact,
            Self::Vendor(_) => ResourceKind::Vendor,
            Self::Unit(_) => ResourceKind::Unit,
            Self::Item(_) => ResourceKind::Item,
        }
    }

    /// Raw serial of the referenced row.
    pub fn raw_id(&self) -> i64 {
        match *self {
            Self::Organization(id) => id.get(),
            Self::Customer(id) => id.get(),
            Self::ConstructionSite(id) => id.get(),
            Self::SiteContact(id) => id.get(),
            Self::Vendor(id) => id.get(),
            Self::Unit(id) => id.get(),
            Self::Item(id) => id.get(),
        }
    }
}

impl core::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} #{}", self.kind(), self.raw_id())
    }
}

impl From<OrganizationId> for ResourceRef {
    fn from(id: OrganizationId) -> Self {
        Self::Organization(id)
    }
}

impl From<CustomerId> for ResourceRef {
    fn from(id: CustomerId) -> Self {
        Self::Customer(id)
    }
}

impl From<SiteId> for ResourceRef {
    fn from(id: SiteId) -> Self {
        Self::ConstructionSite(id)
    }
}

impl From<SiteContactId> for ResourceRef {
    fn from(id: SiteContactId) -> Self {
        Self::SiteContact(id)
    }
}

impl From<VendorId> for ResourceRef {
    fn from(id: VendorId) -> Self {
        Self::Vendor(id)
    }
}

impl From<UnitId> for ResourceRef {
    fn from(id: UnitId) -> Self {
        Self::Unit(id)
    }
}

impl From<ItemId> for ResourceRef {
    fn from(id: ItemId) -> Self {
        Self::Item(id)
    }
}
