//! Password credentials.

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use async_trait::async_trait;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stored password hash (PHC string). Never the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash previously produced by `hash` (e.g. loaded from storage).
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("credential lookup failed: {0}")]
    Lookup(String),
}

/// Checks username/password pairs and produces hashes for new accounts.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError>;

    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialError>;
}

/// Argon2id hashing with default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2Passwords;

impl Argon2Passwords {
    pub fn new() -> Self {
        Self
    }

    pub fn hash_password(&self, password: &str) -> Result<PasswordHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }

    pub fn verify_password(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| CredentialError::MalformedHash(err.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let passwords = Argon2Passwords::new();
        let hash = passwords.hash_password("password123").unwrap();
        assert_ne!(hash.as_str(), "password123");
        assert!(passwords.verify_password("password123", &hash).unwrap());
        assert!(!passwords.verify_password("password124", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let passwords = Argon2Passwords::new();
        let a = passwords.hash_password("same-secret").unwrap();
        let b = passwords.hash_password("same-secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let passwords = Argon2Passwords::new();
        let err = passwords
            .verify_password("x", &PasswordHash::from_phc("not-a-phc-string"))
            .unwrap_err();
        assert!(matches!(err, CredentialError::MalformedHash(_)));
    }
}
