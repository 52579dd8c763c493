//! Shared types for the request-admission guard.
//!
//! The axum middleware itself lives in the server crate; this module holds
//! the state it closes over and the subject it injects into admitted
//! requests.

use std::sync::Arc;

use crate::error::AuthResult;
use crate::token::TokenService;

/// Shared state for the auth gate.
#[derive(Clone)]
pub struct AuthState {
    /// The token authority used to validate incoming tokens.
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    /// Creates auth state around a token service.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Validates a raw `Authorization` header value and returns the subject.
    ///
    /// The original wire format sends the bare token; a `Bearer ` prefix is
    /// tolerated so standard clients work too.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` for missing, malformed, forged, or
    /// expired tokens.
    pub fn authenticate(&self, header_value: &str) -> AuthResult<AuthSubject> {
        let token = header_value
            .strip_prefix("Bearer ")
            .unwrap_or(header_value)
            .trim();
        self.tokens.validate(token).map(AuthSubject)
    }
}

/// The authenticated subject, inserted into request extensions on success.
///
/// All authenticated subjects have equal rights; downstream handlers may
/// read the username for logging but perform no further scoping.
#[derive(Debug, Clone)]
pub struct AuthSubject(pub String);

impl AuthSubject {
    /// The subject username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.0
    }
}
