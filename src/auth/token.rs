// JWT token issuance, verification and revocation

use crate::auth::{
    blacklist::Blacklist,
    clock::{Clock, SystemClock},
    error::{AuthError, VerificationFailure},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub iat: i64,    // issued at timestamp
    pub exp: i64,    // expiration timestamp
}

/// Token service for JWT operations
///
/// Tokens are HS256 JWTs signed with a process-wide secret. Verification checks,
/// in order: signature and structure, the revocation set, then expiry. Expiry is
/// checked here rather than by `jsonwebtoken` so that a token expiring exactly
/// now is already rejected and no leeway applies.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    blacklist: Blacklist,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a new TokenService using the system clock
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self::with_clock(secret, ttl_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &str, ttl_secs: i64, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
            blacklist: Blacklist::new(),
            clock,
        }
    }

    /// Issue a token for a subject the caller has already authenticated
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        let exp = now
            .checked_add(self.ttl_secs)
            .ok_or_else(|| {
                AuthError::TokenGeneration(format!("ttl of {}s overflows exp", self.ttl_secs))
            })?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify a token and return its subject
    ///
    /// The subject is not checked against the user store here; callers must
    /// re-resolve it before trusting it.
    pub fn verify(&self, token: &str) -> Result<String, VerificationFailure> {
        let claims = self.decode_claims(token)?;

        if self.blacklist.contains(token) {
            return Err(VerificationFailure::Revoked);
        }

        if claims.exp <= self.clock.now() {
            return Err(VerificationFailure::Expired);
        }

        Ok(claims.sub)
    }

    /// Revoke a token. Never fails.
    ///
    /// Tokens that do not carry a valid signature can never verify, so they are
    /// not recorded.
    pub fn revoke(&self, token: &str) {
        match self.decode_claims(token) {
            Ok(claims) => {
                self.blacklist.insert(token, claims.exp);
                debug!("Revoked token for subject {}", claims.sub);
                self.sweep_revoked();
            }
            Err(failure) => debug!("Ignoring revocation of unverifiable token: {}", failure),
        }
    }

    /// Drop revocation entries for tokens that have expired on their own
    pub fn sweep_revoked(&self) -> usize {
        let removed = self.blacklist.sweep(self.clock.now());
        if removed > 0 {
            debug!("Pruned {} expired revocation entries", removed);
        }
        removed
    }

    pub fn revoked_count(&self) -> usize {
        self.blacklist.len()
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, VerificationFailure> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| VerificationFailure::Malformed)
    }
}
