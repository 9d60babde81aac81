//! Notification dispatch: config check, credential parse, token, publish, classify, log.

pub mod dispatcher;
pub mod error;
pub mod message;
pub mod subject;

pub use dispatcher::{DispatchOutcome, DispatchResult, NotificationDispatcher};
pub use error::DispatchError;
pub use subject::{NoSubjects, StaticSubjects, SubjectResolver};
