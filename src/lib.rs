//! # Index Notifier Library
//!
//! Notifies a search-indexing API when content is published or removed and
//! keeps a bounded, queryable audit trail of every attempt.
//!
//! Modules:
//! - `config` — service configuration, defaults and validation
//! - `credentials` — service-account key parsing and credential sources
//! - `auth` — OAuth2 JWT-bearer token exchange
//! - `cache` — single-slot bearer token cache
//! - `dispatch` — publish/delete notifications and outcome classification
//! - `store` — SQLite-backed notification log
//! - `rotation` — retention policies over the log

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod helpers;
pub mod observability;
pub mod rotation;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod tests;
pub mod utils;


pub use crate::config::notifier::ServiceConfig;
pub use crate::dispatch::{DispatchError, DispatchOutcome, DispatchResult, NotificationDispatcher};
pub use crate::store::{LogEntry, LogStore, NotificationType};
