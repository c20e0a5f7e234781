//! Sessions and the principal resolver.
//!
//! Storage of sessions is outside this crate; the resolver only needs the
//! `SessionStore` lookup contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use siteerp_core::{OrganizationId, UserId};

use crate::{Principal, Role};

/// Opaque bearer token identifying a session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Fresh random token (two v4 UUIDs, 244 random bits).
    pub fn generate() -> Self {
        Self(format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()))
    }

    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// What the session store remembers about a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl SessionRecord {
    /// Deterministically validate the session's time window.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionValidationError> {
        if self.expires_at <= self.issued_at {
            return Err(SessionValidationError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(SessionValidationError::NotYetValid);
        }
        if now >= self.expires_at {
            return Err(SessionValidationError::Expired);
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("session store failure: {0}")]
pub struct SessionStoreError(pub String);

/// Session persistence contract.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn lookup(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionRecord>, SessionStoreError>;
    async fn insert(
        &self,
        token: SessionToken,
        record: SessionRecord,
    ) -> Result<(), SessionStoreError>;
    async fn revoke(&self, token: &SessionToken) -> Result<(), SessionStoreError>;
}

#[async_trait]
impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    async fn lookup(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionRecord>, SessionStoreError> {
        (**self).lookup(token).await
    }

    async fn insert(
        &self,
        token: SessionToken,
        record: SessionRecord,
    ) -> Result<(), SessionStoreError> {
        (**self).insert(token, record).await
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        (**self).revoke(token).await
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error(transparent)]
    SessionStore(#[from] SessionStoreError),
}

/// Turns a session token into an authenticated `Principal`.
#[derive(Debug, Clone)]
pub struct PrincipalResolver<S> {
    sessions: S,
}

impl<S: SessionStore> PrincipalResolver<S> {
    pub fn new(sessions: S) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub async fn resolve(&self, token: &SessionToken) -> Result<Principal, AuthenticationError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// `resolve` with an explicit clock, for deterministic tests.
    pub async fn resolve_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthenticationError> {
        let record = self
            .sessions
            .lookup(token)
            .await?
            .ok_or(AuthenticationError::Unauthenticated)?;

        if let Err(e) = record.validate(now) {
            tracing::debug!(user_id = %record.user_id, "rejecting session: {e}");
            return Err(AuthenticationError::Unauthenticated);
        }

        Principal::new(record.user_id, record.role, record.organization_id).map_err(|e| {
            tracing::warn!(user_id = %record.user_id, "session violates principal invariant: {e}");
            AuthenticationError::Unauthenticated
        })
    }
}
