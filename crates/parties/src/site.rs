use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteerp_core::{CustomerId, DomainResult, Entity, MapLocation, SiteId, Validator};

/// A construction site. Owned by a customer, and through it by the
/// customer's organization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionSite {
    pub id: SiteId,
    pub customer_id: CustomerId,
    pub site_name: String,
    pub street_name: String,
    pub area: String,
    pub city: String,
    pub map_location: Option<MapLocation>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ConstructionSite {
    type Id = SiteId;

    fn id(&self) -> SiteId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSite {
    pub customer_id: CustomerId,
    pub site_name: String,
    pub street_name: String,
    pub area: String,
    pub city: String,
    #[serde(default)]
    pub map_location: Option<MapLocation>,
}

impl NewSite {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.require_max_len("siteName", &self.site_name, 200)
            .require("streetName", &self.street_name)
            .require("area", &self.area)
            .require("city", &self.city);
        if let Some(loc) = &self.map_location {
            loc.check("mapLocation", &mut v);
        }
        v.finish()
    }
}

/// Partial update. The owning customer is not updatable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUpdate {
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub street_name: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub map_location: Option<MapLocation>,
}

impl SiteUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        if let Some(name) = &self.site_name {
            v.require_max_len("siteName", name, 200);
        }
        for (field, value) in [
            ("streetName", &self.street_name),
            ("area", &self.area),
            ("city", &self.city),
        ] {
            if let Some(value) = value {
                v.require(field, value);
            }
        }
        if let Some(loc) = &self.map_location {
            loc.check("mapLocation", &mut v);
        }
        v.finish()
    }

    pub fn apply(self, site: &mut ConstructionSite) {
        if let Some(v) = self.site_name {
            site.site_name = v;
        }
        if let Some(v) = self.street_name {
            site.street_name = v;
        }
        if let Some(v) = self.area {
            site.area = v;
        }
        if let Some(v) = self.city {
            site.city = v;
        }
        if let Some(v) = self.map_location {
            site.map_location = Some(v);
        }
    }
}
