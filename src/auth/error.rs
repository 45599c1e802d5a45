// Authentication and authorization error types

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::ApiError;

/// Reasons a bearer token fails to establish an identity
///
/// These never reach the client. The authentication pipeline absorbs all of
/// them and carries on with an anonymous request, so a caller cannot tell a
/// malformed token from an expired or revoked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// Bad signature, bad encoding, or missing claims
    #[error("token is malformed")]
    Malformed,

    /// `exp` is at or before the current time
    #[error("token has expired")]
    Expired,

    /// Token was revoked by a logout
    #[error("token has been revoked")]
    Revoked,

    /// Token is valid but its subject no longer exists
    #[error("token subject no longer exists")]
    SubjectMissing,
}

/// Authentication and authorization errors surfaced at the HTTP boundary
#[derive(Debug, Error)]
pub enum AuthError {
    /// Protected route reached without an authenticated identity
    #[error("Authentication required")]
    Unauthenticated,

    /// Login with an unknown username or a wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// Message that is safe to send to clients
    pub fn error_message(&self) -> String {
        match self {
            AuthError::Unauthenticated | AuthError::InvalidCredentials => self.to_string(),
            AuthError::TokenGeneration(_) | AuthError::PasswordHash(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Rendered through `ApiError` so every denial has the same body shape
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
