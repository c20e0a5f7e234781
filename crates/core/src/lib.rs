//! `siteerp-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod resource;
pub mod validate;
pub mod value_object;

pub use entity::{Entity, OrganizationOwned};
pub use error::{DomainError, DomainResult, FieldError};
pub use id::{CustomerId, ItemId, OrganizationId, SiteContactId, SiteId, UnitId, UserId, VendorId};
pub use resource::{ResourceKind, ResourceRef};
pub use validate::Validator;
pub use value_object::{MapLocation, PrimaryContact, ValueObject};
