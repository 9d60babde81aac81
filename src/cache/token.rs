use chrono::{DateTime, Utc};

use crate::helpers::time::{expiry_after, token_cache_lifetime_seconds};

/// Bearer token with its computed cache expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub fetched_at: DateTime<Utc>,
    /// `fetched_at + max(60, expires_in - safety_margin)`, capped at the latest instant chrono can hold
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(
        access_token: String,
        expires_in: i64,
        safety_margin_seconds: u64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let lifetime = token_cache_lifetime_seconds(expires_in, safety_margin_seconds);
        Self {
            access_token,
            fetched_at,
            expires_at: expiry_after(fetched_at, lifetime),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn lifetime_seconds(&self) -> i64 {
        (self.expires_at - self.fetched_at).num_seconds()
    }
}
