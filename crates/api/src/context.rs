use siteerp_auth::{Principal, SessionToken};

/// Authenticated caller of a request.
///
/// Inserted by the auth middleware and immutable for the rest of the request.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    principal: Principal,
    token: SessionToken,
}

impl PrincipalContext {
    pub fn new(principal: Principal, token: SessionToken) -> Self {
        Self { principal, token }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Session token the request was authenticated with.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}
