use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::notifier::{ServiceConfig, YesNo};
use crate::dispatch::NotificationDispatcher;
use crate::rotation::{RotationEngine, RotationReport};
use crate::store::LogStore;
use crate::utils::channel;

/// Wired service: one log store, one dispatcher, one rotation engine.
pub struct App {
    pub config: ServiceConfig,
    pub store: Arc<LogStore>,
    pub dispatcher: NotificationDispatcher,
    pub rotation: RotationEngine,
}

impl App {
    pub fn build(config: ServiceConfig) -> Result<Self> {
        let store = LogStore::open(&config.storage.path)
            .with_context(|| format!("opening log store {}", config.storage.path))?;
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: ServiceConfig, store: Arc<LogStore>) -> Result<Self> {
        let dispatcher = NotificationDispatcher::from_config(&config, store.clone())
            .context("building HTTP clients")?;
        let rotation = RotationEngine::new(store.clone(), channel::run());
        Ok(Self { config, store, dispatcher, rotation })
    }

    pub async fn rotate(&self) -> Result<RotationReport> {
        let policy = self.config.rotation.policy();
        self.rotation.run(policy).await.context("log rotation failed")
    }

    /// Drop stored data if the operator opted in. Returns whether anything was removed.
    pub fn uninstall(&self) -> Result<bool> {
        if self.config.storage.delete_data_on_uninstall != YesNo::Yes {
            info!("delete_data_on_uninstall is 'no', keeping log data");
            return Ok(false);
        }
        self.store.drop_all().context("dropping log table")?;
        Ok(true)
    }
}
