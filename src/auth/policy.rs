// Route access policy: which paths are public and which need an identity

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::auth::{error::AuthError, middleware::AuthenticatedUser};

/// Access level of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// Path pattern: exact (`/user/login`) or prefix wildcard (`/swagger-ui/**`)
///
/// A prefix pattern matches its base path and every path below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Prefix(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(base) => RoutePattern::Prefix(base.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => path == exact,
            RoutePattern::Prefix(base) => is_under(path, base),
        }
    }

    /// Whether some path could match both patterns
    pub fn overlaps(&self, other: &RoutePattern) -> bool {
        match (self, other) {
            (RoutePattern::Exact(a), RoutePattern::Exact(b)) => a == b,
            (RoutePattern::Exact(path), prefix @ RoutePattern::Prefix(_))
            | (prefix @ RoutePattern::Prefix(_), RoutePattern::Exact(path)) => prefix.matches(path),
            (RoutePattern::Prefix(a), RoutePattern::Prefix(b)) => is_under(a, b) || is_under(b, a),
        }
    }
}

fn is_under(path: &str, base: &str) -> bool {
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::Exact(path) => write!(f, "{}", path),
            RoutePattern::Prefix(base) => write!(f, "{}/**", base),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("route patterns '{0}' and '{1}' overlap")]
    Overlap(String, String),
}

/// Static route → access table consulted after authentication
///
/// Patterns must be disjoint; construction fails otherwise. Paths matching no
/// pattern require an authenticated identity.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<(RoutePattern, Access)>,
}

impl AccessPolicy {
    pub fn new<'a>(rules: impl IntoIterator<Item = (&'a str, Access)>) -> Result<Self, PolicyError> {
        let rules: Vec<(RoutePattern, Access)> = rules
            .into_iter()
            .map(|(pattern, access)| (RoutePattern::parse(pattern), access))
            .collect();

        for (i, (a, _)) in rules.iter().enumerate() {
            for (b, _) in &rules[i + 1..] {
                if a.overlaps(b) {
                    return Err(PolicyError::Overlap(a.to_string(), b.to_string()));
                }
            }
        }

        Ok(Self { rules })
    }

    /// The API's route table
    pub fn default_rules() -> Vec<(&'static str, Access)> {
        vec![
            ("/user/save", Access::Public),
            ("/user/login", Access::Public),
            ("/swagger-ui/**", Access::Public),
            ("/api-docs/**", Access::Public),
            ("/health", Access::Public),
            ("/user/get/**", Access::Authenticated),
            ("/user/update/**", Access::Authenticated),
            ("/user/delete/**", Access::Authenticated),
            ("/user/logout", Access::Authenticated),
        ]
    }

    pub fn access_for(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, access)| *access)
            .unwrap_or(Access::Authenticated)
    }

    pub fn check(&self, path: &str, user: Option<&AuthenticatedUser>) -> Result<(), AuthError> {
        match (self.access_for(path), user) {
            (Access::Public, _) | (Access::Authenticated, Some(_)) => Ok(()),
            (Access::Authenticated, None) => Err(AuthError::Unauthenticated),
        }
    }
}

/// Authorization gate middleware; must run after `authenticate`
pub async fn authorize(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path();
    if let Err(e) = policy.check(path, request.extensions().get::<AuthenticatedUser>()) {
        debug!("Denied anonymous request to {}", path);
        return Err(e);
    }

    Ok(next.run(request).await)
}
