use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siteerp_core::{DomainResult, Entity, SiteContactId, SiteId, Validator};

/// Person to reach at a construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContact {
    pub id: SiteContactId,
    pub site_id: SiteId,
    pub name: String,
    pub number: String,
    pub designation: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for SiteContact {
    type Id = SiteContactId;

    fn id(&self) -> SiteContactId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSiteContact {
    pub site_id: SiteId,
    pub name: String,
    pub number: String,
    pub designation: String,
    pub email: String,
    pub phone: String,
}

impl NewSiteContact {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.require_max_len("name", &self.name, 200)
            .require("number", &self.number)
            .require("designation", &self.designation)
            .require_email("email", &self.email)
            .require("phone", &self.phone);
        v.finish()
    }
}
