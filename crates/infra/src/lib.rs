//! Infrastructure layer: storage backends, ownership resolution, the
//! tenant-scoped repository facade, sessions, credentials and config.

pub mod authz;
pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod locator;
pub mod repository;
pub mod session;
pub mod store;

pub use authz::{AccessError, Authorizer};
pub use bootstrap::{BootstrapError, BootstrapOutcome, ensure_superadmin};
pub use config::{AppConfig, BootstrapAccount, ConfigError, Persistence};
pub use credentials::StoreCredentialVerifier;
pub use locator::{LocateError, MAX_OWNERSHIP_HOPS, ResourceLocator};
pub use repository::{
    OrganizationWithAdmin, RepositoryError, RepositoryResult, ScopedRepository, TenantRepository,
};
pub use session::{InMemorySessionStore, session_for};
pub use store::{
    DataStore, InMemoryDataStore, PostgresDataStore, StoreError, StoreTransaction,
};
