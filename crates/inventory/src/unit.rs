use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteerp_core::{DomainResult, Entity, OrganizationId, OrganizationOwned, UnitId, Validator};

/// Unit of measure (e.g. "m³", "bag", "hour").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> UnitId {
        self.id
    }
}

impl OrganizationOwned for Unit {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUnit {
    pub organization_id: OrganizationId,
    pub name: String,
}

impl NewUnit {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.require_max_len("name", &self.name, 50);
        v.finish()
    }
}
