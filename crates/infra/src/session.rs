//! In-process session store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use siteerp_auth::{SessionRecord, SessionStore, SessionStoreError, SessionToken, User};

/// Sessions kept in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop sessions that expired before `now`; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError("lock poisoned".to_string()))?;
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at > now);
        Ok(before - sessions.len())
    }

    /// Purge expired sessions every `period` until the store is dropped.
    pub fn spawn_purge(
        self: &Arc<Self>,
        period: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let sessions = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            // the first tick completes immediately
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                match sessions.purge_expired(Utc::now()) {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "expired sessions purged"),
                    Err(e) => tracing::warn!("session purge failed: {e}"),
                }
            }
        })
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn lookup(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionRecord>, SessionStoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionStoreError("lock poisoned".to_string()))?;
        Ok(sessions.get(token).cloned())
    }

    async fn insert(
        &self,
        token: SessionToken,
        record: SessionRecord,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError("lock poisoned".to_string()))?;
        sessions.insert(token, record);
        Ok(())
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionStoreError("lock poisoned".to_string()))?;
        sessions.remove(token);
        Ok(())
    }
}

/// Session record for a freshly authenticated user.
///
/// Fails when `now + ttl` is not a representable instant.
pub fn session_for(
    user: &User,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<SessionRecord, SessionStoreError> {
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| SessionStoreError(format!("session lifetime {ttl} is out of range")))?;
    Ok(SessionRecord {
        user_id: user.id,
        role: user.role,
        organization_id: user.organization_id,
        issued_at: now,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use siteerp_auth::{AuthenticationError, PasswordHash, PrincipalResolver, Role};
    use siteerp_core::{OrganizationId, UserId};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(7),
            username: "site_lead".into(),
            password_hash: PasswordHash::from_phc("$argon2id$stub"),
            email: "lead@acme.test".into(),
            role: Role::Manager,
            designation: None,
            contact_number: None,
            organization_id: Some(OrganizationId::new(5)),
            department: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn issued_session_resolves_until_revoked() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let resolver = PrincipalResolver::new(Arc::clone(&sessions));
        let now = Utc::now();
        let token = SessionToken::generate();
        sessions
            .insert(token.clone(), session_for(&user(), now, Duration::hours(1)).unwrap())
            .await
            .unwrap();

        let principal = resolver.resolve_at(&token, now).await.unwrap();
        assert_eq!(principal.user_id(), UserId::new(7));
        assert_eq!(principal.organization_id(), Some(OrganizationId::new(5)));

        sessions.revoke(&token).await.unwrap();
        assert_eq!(
            resolver.resolve_at(&token, now).await.unwrap_err(),
            AuthenticationError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let sessions = InMemorySessionStore::new();
        let now = Utc::now();
        sessions
            .insert(
                SessionToken::generate(),
                session_for(&user(), now - Duration::hours(2), Duration::hours(1)).unwrap(),
            )
            .await
            .unwrap();
        let live = SessionToken::generate();
        sessions
            .insert(live.clone(), session_for(&user(), now, Duration::hours(1)).unwrap())
            .await
            .unwrap();

        assert_eq!(sessions.purge_expired(now).unwrap(), 1);
        assert!(sessions.lookup(&live).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn background_purge_evicts_expired_sessions() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let expired = SessionToken::generate();
        let issued = Utc::now() - Duration::hours(2);
        sessions
            .insert(expired.clone(), session_for(&user(), issued, Duration::hours(1)).unwrap())
            .await
            .unwrap();

        let purge = sessions.spawn_purge(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(sessions.lookup(&expired).await.unwrap().is_none());
        purge.abort();
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let err = session_for(&user(), Utc::now(), Duration::MAX).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
