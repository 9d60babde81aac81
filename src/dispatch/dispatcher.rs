use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::auth::{AuthClient, FetchAccessToken};
use crate::cache::TokenCache;
use crate::config::notifier::{IndexingConfig, ServiceConfig};
use crate::credentials::{self, CredentialSource};
use crate::dispatch::error::DispatchError;
use crate::dispatch::message::{api_error_message, json_body, metadata_url, success_message};
use crate::dispatch::subject::{NoSubjects, SubjectResolver};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::store::{LogStore, NewLogEntry, NotificationType, MAX_SUBJECT_ID};

/// Successful publish (HTTP 2xx).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: u16,
    pub metadata_url: Option<String>,
    /// id of the log entry, `None` if the write failed
    pub log_id: Option<i64>,
}

pub type DispatchResult = Result<DispatchOutcome, DispatchError>;

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    notification_type: NotificationType,
}

struct Published {
    status: u16,
    metadata_url: Option<String>,
}

/// Sends publish/delete notifications to the indexing endpoint.
///
/// Every call to [`send`](Self::send) writes exactly one log entry,
/// whichever way it ends.
pub struct NotificationDispatcher<A = AuthClient> {
    client: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialSource>,
    auth: A,
    cache: TokenCache,
    store: Arc<LogStore>,
    subjects: Arc<dyn SubjectResolver>,
}

impl NotificationDispatcher<AuthClient> {
    pub fn from_config(cfg: &ServiceConfig, store: Arc<LogStore>) -> reqwest::Result<Self> {
        let auth = AuthClient::new(&cfg.auth)?;
        let cache = TokenCache::new(cfg.auth.safety_margin_seconds);
        Self::new(&cfg.indexing, Arc::new(cfg.auth.credentials.clone()), auth, cache, store)
    }
}

impl<A: FetchAccessToken> NotificationDispatcher<A> {
    pub fn new(
        indexing: &IndexingConfig,
        credentials: Arc<dyn CredentialSource>,
        auth: A,
        cache: TokenCache,
        store: Arc<LogStore>,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(indexing.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: indexing.endpoint.clone(),
            credentials,
            auth,
            cache,
            store,
            subjects: Arc::new(NoSubjects),
        })
    }

    pub fn with_subject_resolver(mut self, subjects: Arc<dyn SubjectResolver>) -> Self {
        self.subjects = subjects;
        self
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    /// Notify the indexing API about `url`. Failures are values, never panics;
    /// none are retried here.
    pub async fn send(&self, url: &str, notification_type: NotificationType) -> DispatchResult {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.dispatch_requests.with_label_values(&[notification_type.as_str()]).inc();

        let subject_id = match self.subjects.resolve(url) {
            id if id > MAX_SUBJECT_ID => {
                warn!(url, subject_id = id, "resolved subject id is not storable, recording as unassociated");
                0
            }
            id => id,
        };
        let attempt = self.attempt(url, notification_type).await;

        let (status, message) = match &attempt {
            Ok(published) => (
                published.status.to_string(),
                success_message(published.metadata_url.as_deref()),
            ),
            Err(err) => (err.status_tag(), err.to_string()),
        };

        let log_id = self
            .record(NewLogEntry::new(subject_id, url, notification_type, status.as_str(), message.as_str()))
            .await;

        metrics.dispatch_outcomes.with_label_values(&[status.as_str()]).inc();
        metrics
            .dispatch_duration
            .with_label_values(&[notification_type.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match attempt {
            Ok(published) => {
                info!(url, status = %status, "{} notification accepted", notification_type);
                Ok(DispatchOutcome {
                    status: published.status,
                    metadata_url: published.metadata_url,
                    log_id,
                })
            }
            Err(err) => {
                warn!(url, status = %status, "{} notification failed: {}", notification_type, err);
                Err(err)
            }
        }
    }

    /// ConfigCheck -> CredentialParse -> TokenAcquire -> Send -> Classify.
    async fn attempt(&self, url: &str, notification_type: NotificationType) -> Result<Published, DispatchError> {
        let raw = self.credentials.raw_credentials().ok_or(DispatchError::ConfigMissing)?;
        let credential = credentials::parse(&raw)?;

        let (token, _from_cache) = self.cache.get_token(&credential, &self.auth).await?;
        if token.is_empty() {
            return Err(DispatchError::TokenUnavailable);
        }

        self.publish(&token, url, notification_type).await
    }

    async fn publish(
        &self,
        token: &str,
        url: &str,
        notification_type: NotificationType,
    ) -> Result<Published, DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&PublishRequest { url, notification_type })
            .send()
            .await
            .map_err(|e| DispatchError::PublishTransport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|err| {
            warn!("reading indexing response body failed: {}", err);
            String::new()
        });

        if status == http::StatusCode::UNAUTHORIZED {
            self.cache.invalidate().await;
            return Err(DispatchError::Unauthorized);
        }

        if status.is_success() {
            return Ok(Published {
                status: status.as_u16(),
                metadata_url: metadata_url(&body),
            });
        }

        Err(DispatchError::Api {
            status: status.as_u16(),
            body: json_body(&body),
            message: api_error_message(status.as_u16(), &body),
        })
    }

    async fn record(&self, entry: NewLogEntry) -> Option<i64> {
        match self.store.append(entry) {
            Ok(id) => Some(id),
            Err(err) => {
                error!("writing dispatch log entry failed: {}", err);
                get_metrics().await.log_write_failures.inc();
                None
            }
        }
    }
}
