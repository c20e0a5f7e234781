//! Startup seeding of the superadmin account.

use thiserror::Error;

use siteerp_auth::{CredentialError, CredentialVerifier, NewUser, Role, User};

use crate::config::BootstrapAccount;
use crate::store::{DataStore, StoreError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(User),
    AlreadyPresent,
}

/// Create the configured superadmin unless a user with that username exists.
///
/// An existing account is left untouched, whatever its role or password.
pub async fn ensure_superadmin<S: DataStore>(
    store: &S,
    credentials: &dyn CredentialVerifier,
    account: &BootstrapAccount,
) -> Result<BootstrapOutcome, BootstrapError> {
    if store.find_user_by_username(&account.username).await?.is_some() {
        tracing::debug!(username = %account.username, "bootstrap account already present");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    if account.default_password {
        tracing::warn!(
            username = %account.username,
            "creating bootstrap superadmin with the built-in password; \
             set BOOTSTRAP_SUPERADMIN_PASSWORD"
        );
    }

    let user = store
        .create_user(NewUser {
            username: account.username.clone(),
            password_hash: credentials.hash(&account.password)?,
            email: account.email.clone(),
            role: Role::Superadmin,
            designation: Some("Super Administrator".to_string()),
            contact_number: None,
            organization_id: None,
            department: Some("Administration".to_string()),
        })
        .await;

    match user {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "bootstrap superadmin created");
            Ok(BootstrapOutcome::Created(user))
        }
        // another instance won the race
        Err(StoreError::Conflict(_)) => Ok(BootstrapOutcome::AlreadyPresent),
        Err(e) => Err(e.into()),
    }
}
