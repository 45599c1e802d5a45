// Revoked token set shared by every in-flight request

use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Concurrent set of revoked tokens
///
/// Tokens are keyed by their SHA-256 digest so raw bearer credentials are never
/// kept in memory after logout. Each entry remembers the token's `exp` so it can
/// be dropped once the token would have expired on its own.
#[derive(Debug, Default)]
pub struct Blacklist {
    entries: DashMap<String, i64>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a token using SHA-256
    fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Insert a token; inserting the same token again is a no-op
    pub fn insert(&self, token: &str, expires_at: i64) {
        self.entries.entry(Self::digest(token)).or_insert(expires_at);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(&Self::digest(token))
    }

    /// Drop entries whose token expired at or before `now`
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self, now: i64) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let live = *expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
