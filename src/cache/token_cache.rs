use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::{AuthError, FetchAccessToken};
use crate::cache::token::CachedToken;
use crate::credentials::ServiceAccountCredential;
use crate::helpers::time::{get_token_safety_margin_seconds, now_utc};
use crate::observability::metrics::get_metrics;

/// Process-wide single-slot token cache for the one configured credential.
///
/// Handles are cheap clones sharing the slot. Concurrent misses may each
/// fetch; the last write wins.
#[derive(Debug, Clone)]
pub struct TokenCache {
    inner: Arc<RwLock<Option<CachedToken>>>,
    safety_margin_seconds: u64,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TokenCache {
    pub fn new(safety_margin_seconds: Option<u64>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            safety_margin_seconds: get_token_safety_margin_seconds(safety_margin_seconds),
        }
    }

    /// Cached token if unexpired, otherwise a fresh one from `fetcher`.
    /// Returns `(token, from_cache)`.
    pub async fn get_token<F: FetchAccessToken>(
        &self,
        credential: &ServiceAccountCredential,
        fetcher: &F,
    ) -> Result<(String, bool), AuthError> {
        if let Some(token) = self.get().await {
            debug!("token cache hit, expires at {}", token.expires_at);
            get_metrics().await.token_cache_hits.inc();
            return Ok((token.access_token, true));
        }

        debug!("token cache miss");
        let fetched = fetcher.fetch_token(credential).await?;
        if fetched.access_token.is_empty() {
            return Ok((fetched.access_token, false));
        }

        let token = CachedToken::new(
            fetched.access_token,
            fetched.expires_in,
            self.safety_margin_seconds,
            now_utc(),
        );
        self.set(token.clone()).await;
        Ok((token.access_token, false))
    }

    /// Token if it exists and is not expired
    pub async fn get(&self) -> Option<CachedToken> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_valid_at(now_utc()))
            .cloned()
    }

    pub async fn set(&self, token: CachedToken) {
        get_metrics().await.token_expiry_unix.set(token.expires_at.timestamp());
        *self.inner.write().await = Some(token);
    }

    /// Drop any cached token unconditionally.
    pub async fn invalidate(&self) {
        let removed = self.inner.write().await.take();
        if removed.is_some() {
            info!("cached access token invalidated");
        }
        let metrics = get_metrics().await;
        metrics.token_invalidations.inc();
        metrics.token_expiry_unix.set(0);
    }
}
