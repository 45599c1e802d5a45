// Authentication middleware and the authenticated-user extractor

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{
    error::{AuthError, VerificationFailure},
    roles::{Role, RoleResolver},
    token::TokenService,
};
use crate::users::repository::UserStore;

/// Identity attached to a request once its bearer token is accepted
///
/// Lives in the request extensions and is dropped with the request. Handlers
/// receive it as an argument; a handler that takes it can only run for
/// authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub roles: BTreeSet<Role>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Resolves bearer tokens to identities
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleResolver>,
}

impl Authenticator {
    pub fn new(
        tokens: Arc<TokenService>,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleResolver>,
    ) -> Self {
        Self {
            tokens,
            users,
            roles,
        }
    }

    /// Verify a token and confirm its subject still exists
    ///
    /// A store failure is reported as `SubjectMissing`: the subject cannot be
    /// confirmed, so the request stays anonymous.
    pub async fn identify(&self, token: &str) -> Result<AuthenticatedUser, VerificationFailure> {
        let subject = self.tokens.verify(token)?;

        let user = match self.users.find_by_username(&subject).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(VerificationFailure::SubjectMissing),
            Err(e) => {
                warn!("User lookup failed while authenticating {}: {:?}", subject, e);
                return Err(VerificationFailure::SubjectMissing);
            }
        };

        let roles = self.roles.roles_for(&user);
        Ok(AuthenticatedUser {
            username: user.username,
            roles,
        })
    }
}

/// Authentication pipeline, run once per request before authorization
///
/// Never rejects a request. Absent, malformed, expired, revoked and orphaned
/// tokens all leave the request anonymous; the authorization gate decides what
/// an anonymous request may reach.
pub async fn authenticate(
    State(authenticator): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        let token = bearer_token(request.headers()).map(str::to_owned);
        if let Some(token) = token {
            match authenticator.identify(&token).await {
                Ok(user) => {
                    debug!("Authenticated {} for {}", user.username, request.uri().path());
                    request.extensions_mut().insert(user);
                }
                Err(failure) => {
                    debug!("Proceeding unauthenticated for {}: {}", request.uri().path(), failure);
                }
            }
        }
    }

    next.run(request).await
}
