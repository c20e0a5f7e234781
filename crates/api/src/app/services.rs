//! Service wiring: storage backend, sessions, credentials, repository.

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;
use thiserror::Error;

use siteerp_auth::PrincipalResolver;
use siteerp_infra::{
    AppConfig, BootstrapError, DataStore, InMemoryDataStore, InMemorySessionStore, Persistence,
    PostgresDataStore, StoreCredentialVerifier, StoreError, TenantRepository, ensure_superadmin,
};

use crate::middleware::SessionResolver;

/// How often expired sessions are dropped from memory.
const SESSION_PURGE_PERIOD: std::time::Duration = std::time::Duration::from_secs(15 * 60);

/// Storage shared by every request.
pub type SharedStore = Arc<dyn DataStore>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to apply schema: {0}")]
    Schema(#[from] StoreError),

    #[error("failed to create bootstrap account: {0}")]
    Bootstrap(#[from] BootstrapError),
}

pub struct AppServices {
    pub repository: TenantRepository<SharedStore>,
    pub credentials: Arc<StoreCredentialVerifier<SharedStore>>,
    pub sessions: Arc<InMemorySessionStore>,
    pub resolver: Arc<SessionResolver>,
    pub session_ttl: Duration,
}

impl AppServices {
    pub fn new(store: SharedStore, session_ttl: Duration) -> Self {
        let credentials = Arc::new(StoreCredentialVerifier::new(Arc::clone(&store)));
        let sessions = Arc::new(InMemorySessionStore::new());
        Self {
            repository: TenantRepository::new(store, credentials.clone()),
            resolver: Arc::new(PrincipalResolver::new(Arc::clone(&sessions))),
            credentials,
            sessions,
            session_ttl,
        }
    }
}

/// Build services for `config` and seed the bootstrap superadmin.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, BuildError> {
    let store: SharedStore = match &config.persistence {
        Persistence::InMemory => {
            tracing::info!("using in-memory store; data is lost on restart");
            Arc::new(InMemoryDataStore::new())
        }
        Persistence::Postgres { database_url } => {
            let pool = PgPool::connect(database_url).await?;
            let store = PostgresDataStore::new(pool);
            store.ensure_schema().await?;
            tracing::info!("using postgres store");
            Arc::new(store)
        }
    };

    let services = AppServices::new(Arc::clone(&store), config.session_ttl);
    services.sessions.spawn_purge(SESSION_PURGE_PERIOD);
    ensure_superadmin(&store, services.credentials.as_ref(), &config.bootstrap).await?;

    Ok(services)
}
