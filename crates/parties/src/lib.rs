//! Parties domain module: customers, their construction sites and site
//! contacts, and vendors.
//!
//! Pure domain types and validation (no IO, no HTTP, no storage).

pub mod contact;
pub mod customer;
pub mod site;
pub mod vendor;

pub use contact::{NewSiteContact, SiteContact};
pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use site::{ConstructionSite, NewSite, SiteUpdate};
pub use vendor::{NewVendor, Vendor, VendorUpdate};
