use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteerp_core::{
    DomainResult, Entity, OrganizationId, OrganizationOwned, PrimaryContact, Validator, VendorId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub contact: PrimaryContact,
    pub created_at: DateTime<Utc>,
}

impl Entity for Vendor {
    type Id = VendorId;

    fn id(&self) -> VendorId {
        self.id
    }
}

impl OrganizationOwned for Vendor {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVendor {
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub contact: PrimaryContact,
}

impl NewVendor {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.require_max_len("name", &self.name, 200)
            .require("address", &self.address);
        self.contact.check(&mut v);
        v.finish()
    }
}

/// Partial update. The owning organization is not updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<PrimaryContact>,
}

impl VendorUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.require_max_len("name", name, 200);
        }
        if let Some(address) = &self.address {
            v.require("address", address);
        }
        if let Some(contact) = &self.contact {
            contact.check(&mut v);
        }
        v.finish()
    }

    pub fn apply(self, vendor: &mut Vendor) {
        if let Some(name) = self.name {
            vendor.name = name;
        }
        if let Some(address) = self.address {
            vendor.address = address;
        }
        if let Some(contact) = self.contact {
            vendor.contact = contact;
        }
    }
}
