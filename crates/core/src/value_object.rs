//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::validate::Validator;

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Primary point of contact recorded on organizations, customers and vendors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryContact {
    #[serde(rename = "primaryContactName")]
    pub name: String,
    #[serde(rename = "primaryContactNumber")]
    pub number: String,
    pub designation: String,
    #[serde(rename = "primaryEmail")]
    pub email: String,
    #[serde(rename = "primaryPhone")]
    pub phone: String,
}

impl ValueObject for PrimaryContact {}

impl PrimaryContact {
    /// Record field problems into `v`. Field names match the wire format.
    pub fn check(&self, v: &mut Validator) {
        v.require("primaryContactName", &self.name)
            .require("primaryContactNumber", &self.number)
            .require("designation", &self.designation)
            .require_email("primaryEmail", &self.email)
            .require("primaryPhone", &self.phone);
    }
}

/// Geographic pin for a construction site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    pub lat: f64,
    pub lng: f64,
}

impl ValueObject for MapLocation {}

impl MapLocation {
    pub fn check(&self, field: &str, v: &mut Validator) {
        if !(-90.0..=90.0).contains(&self.lat) {
            v.reject(format!("{field}.lat"), "must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            v.reject(format!("{field}.lng"), "must be between -180 and 180");
        }
    }
}
