//! `siteerp-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: sessions and
//! user lookups are reached through traits implemented elsewhere.

pub mod action;
pub mod authorize;
pub mod credentials;
pub mod principal;
pub mod roles;
pub mod session;
pub mod user;

pub use action::Action;
pub use authorize::{AuthorizationExplanation, AuthzError, Decision, DecisionRule, decide, explain};
pub use credentials::{Argon2Passwords, CredentialError, CredentialVerifier, PasswordHash};
pub use principal::{Principal, PrincipalError, Scope};
pub use roles::{Role, UnknownRole};
pub use session::{
    AuthenticationError, PrincipalResolver, SessionRecord, SessionStore, SessionStoreError,
    SessionToken, SessionValidationError,
};
pub use user::{CreateUser, NewUser, User};
