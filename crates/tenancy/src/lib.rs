//! Tenancy domain module (organizations and their bootstrap).
//!
//! Pure domain types and validation (no IO, no HTTP, no storage).

pub mod organization;

pub use organization::{NewOrganization, Organization, OrganizationSetup};
