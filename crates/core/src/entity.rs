//! Entity traits: identity + tenant ownership.

use crate::id::OrganizationId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity tagged directly with its owning organization.
///
/// Ownership is fixed at creation; nothing in the domain moves an entity to a
/// different organization afterwards.
pub trait OrganizationOwned: Entity {
    fn organization_id(&self) -> OrganizationId;
}
