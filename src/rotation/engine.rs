use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::helpers::time::{days_ago, now_utc};
use crate::observability::metrics::get_metrics;
use crate::rotation::policy::RetentionPolicy;
use crate::store::{LogStore, StoreResult};

/// Fired after a rotation that removed rows, so collaborators can drop
/// anything derived from the log table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationEvent {
    pub policy: RetentionPolicy,
    pub deleted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationReport {
    pub policy: RetentionPolicy,
    pub deleted: usize,
}

/// Applies a retention policy to the whole log table. Every run recomputes
/// from the full table, so repeating a run without new entries deletes nothing.
#[derive(Debug, Clone)]
pub struct RotationEngine {
    store: Arc<LogStore>,
    events: Sender<RotationEvent>,
}

impl RotationEngine {
    pub fn new(store: Arc<LogStore>, events: Sender<RotationEvent>) -> Self {
        Self { store, events }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RotationEvent> {
        self.events.subscribe()
    }

    pub async fn run(&self, policy: RetentionPolicy) -> StoreResult<RotationReport> {
        self.run_at(policy, now_utc()).await
    }

    /// Same as [`run`](Self::run) with an explicit "now" for the age cutoff.
    pub async fn run_at(&self, policy: RetentionPolicy, now: DateTime<Utc>) -> StoreResult<RotationReport> {
        let deleted = match policy {
            RetentionPolicy::LatestPerSubject => self.store.delete_all_but_latest_per_subject()?,
            RetentionPolicy::MaxAge { days } if days > 0 => match days_ago(now, days) {
                Some(cutoff) => self.store.delete_older_than(cutoff)?,
                None => {
                    debug!(days, "age cutoff predates the representable range, nothing to delete");
                    0
                }
            },
            RetentionPolicy::MaxCount { count } if count > 0 => {
                self.store.delete_beyond_newest(count as u64)?
            }
            RetentionPolicy::MaxAge { .. } | RetentionPolicy::MaxCount { .. } => {
                debug!("rotation value for '{}' is not positive, skipping", policy.name());
                0
            }
        };

        if deleted > 0 {
            info!(deleted, policy = policy.name(), "log rotation removed entries");
            get_metrics()
                .await
                .rotation_deleted
                .with_label_values(&[policy.name()])
                .inc_by(deleted as u64);
            if let Err(err) = self.events.send(RotationEvent { policy, deleted }) {
                debug!("rotation event had no listeners: {}", err);
            }
        } else {
            debug!(policy = policy.name(), "log rotation found nothing to delete");
        }

        Ok(RotationReport { policy, deleted })
    }

    /// Run `policy` once per `interval` on a background task. A failed run
    /// leaves the table as it was; the next tick tries again.
    pub fn spawn_schedule(&self, policy: RetentionPolicy, interval: Duration) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                info!("log rotation cycle start ({})", policy);
                if let Err(err) = engine.run(policy).await {
                    error!("log rotation failed: {}", err);
                }
            }
        })
    }
}
