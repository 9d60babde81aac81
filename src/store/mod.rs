//! Persistent audit trail of dispatch attempts.

pub mod log_entry;
pub mod log_store;
pub mod query;
pub mod schema;

pub use log_entry::{LogEntry, NewLogEntry, NotificationType, MAX_SUBJECT_ID};
pub use log_store::{LogStore, StoreError, StoreResult};
pub use query::{LogFilter, LogPage, LogSort, PageRequest, SortColumn, SortDirection};
