// Authentication service - login and logout

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{error::AuthError, password::PasswordService, token::TokenService};
use crate::error::ApiError;
use crate::users::repository::UserStore;

/// Authentication service coordinating credential checks and tokens
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
    /// Hash checked for unknown usernames so both failures cost one Argon2 run
    decoy_hash: Option<Arc<str>>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: PasswordService,
        tokens: Arc<TokenService>,
    ) -> Self {
        let decoy_hash: Option<Arc<str>> = match passwords.hash_password("decoy-password") {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                warn!("Could not prepare decoy password hash: {}", e);
                None
            }
        };

        Self {
            users,
            passwords,
            tokens,
            decoy_hash,
        }
    }

    /// Check credentials and issue a token
    ///
    /// An unknown username and a wrong password fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                debug!("Login for unknown user {}", username);
                if let Some(hash) = &self.decoy_hash {
                    let _ = self.passwords.verify_password(password, hash);
                }
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.passwords.verify_password(password, &user.password_hash)? {
            debug!("Wrong password for user {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&user.username)?;
        info!("User {} logged in", user.username);
        Ok(token)
    }

    /// Revoke the caller's token. Always succeeds.
    pub fn logout(&self, username: &str, token: &str) {
        self.tokens.revoke(token);
        info!("User {} logged out", username);
    }
}
