// Authentication module
// Stateless bearer-token authentication: issuance, per-request verification,
// revocation, and the route access policy

pub mod blacklist;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod roles;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::{AuthError, VerificationFailure};
pub use handlers::{login_handler, logout_handler};
pub use middleware::{authenticate, AuthenticatedUser, Authenticator};
pub use models::{LoginRequest, LoginResponse};
pub use password::PasswordService;
pub use policy::{authorize, Access, AccessPolicy};
pub use roles::{Role, RoleResolver, StaticRoles};
pub use service::AuthService;
pub use token::TokenService;
