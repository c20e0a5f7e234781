//! Username/password verification against the user table.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use siteerp_auth::{Argon2Passwords, CredentialError, CredentialVerifier, PasswordHash, User};

use crate::store::DataStore;

/// Checks passwords against the Argon2 hashes stored with each user.
#[derive(Debug, Clone)]
pub struct StoreCredentialVerifier<S> {
    store: S,
    passwords: Argon2Passwords,
    /// Verified against when the username is unknown, so both outcomes cost
    /// one Argon2 verification.
    decoy: Arc<OnceLock<PasswordHash>>,
}

impl<S: DataStore> StoreCredentialVerifier<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            passwords: Argon2Passwords::new(),
            decoy: Arc::default(),
        }
    }

    /// The user behind `username` if `password` matches, `None` otherwise.
    /// Unknown usernames and wrong passwords are indistinguishable, in result
    /// and in hashing work.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, CredentialError> {
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await
            .map_err(|e| CredentialError::Lookup(e.to_string()))?;

        let Some(user) = user else {
            self.passwords.verify_password(password, self.decoy_hash()?)?;
            tracing::debug!("login attempt for unknown username");
            return Ok(None);
        };

        if self.passwords.verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = %user.id, "login attempt with wrong password");
            Ok(None)
        }
    }

    fn decoy_hash(&self) -> Result<&PasswordHash, CredentialError> {
        if let Some(hash) = self.decoy.get() {
            return Ok(hash);
        }
        let hash = self.passwords.hash_password("unknown-user-decoy")?;
        Ok(self.decoy.get_or_init(|| hash))
    }
}

#[async_trait]
impl<S: DataStore> CredentialVerifier for StoreCredentialVerifier<S> {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        Ok(self.authenticate(username, password).await?.is_some())
    }

    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialError> {
        self.passwords.hash_password(password)
    }
}
