//! Storage boundary for tenant-owned entities.
//!
//! `DataStore` is raw data access without any notion of callers; tenant
//! isolation is layered on top by `crate::repository`.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryDataStore, InMemoryTransaction};
pub use postgres::PostgresDataStore;
pub use r#trait::{DataStore, StoreError, StoreTransaction};
