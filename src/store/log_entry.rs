use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest subject id the store accepts (SQLite INTEGER is signed 64-bit).
pub const MAX_SUBJECT_ID: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "URL_UPDATED")]
    UrlUpdated,
    #[serde(rename = "URL_DELETED")]
    UrlDeleted,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::UrlUpdated => "URL_UPDATED",
            NotificationType::UrlDeleted => "URL_DELETED",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "URL_UPDATED" => Ok(NotificationType::UrlUpdated),
            "URL_DELETED" => Ok(NotificationType::UrlDeleted),
            other => Err(format!("unknown notification type '{}'", other)),
        }
    }
}

/// One persisted dispatch attempt. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: i64,
    /// 0 = unknown / unassociated
    pub subject_id: u64,
    pub url: String,
    pub notification_type: NotificationType,
    /// numeric HTTP code or a symbolic error tag
    pub status_code: String,
    pub message: String,
    pub notified_at: DateTime<Utc>,
}

/// Insert payload; `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub subject_id: u64,
    pub url: String,
    pub notification_type: NotificationType,
    pub status_code: String,
    pub message: String,
    /// defaults to now (UTC) when unset
    pub notified_at: Option<DateTime<Utc>>,
}

impl NewLogEntry {
    pub fn new(
        subject_id: u64,
        url: impl Into<String>,
        notification_type: NotificationType,
        status_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject_id,
            url: url.into(),
            notification_type,
            status_code: status_code.into(),
            message: message.into(),
            notified_at: None,
        }
    }

    pub fn at(mut self, notified_at: DateTime<Utc>) -> Self {
        self.notified_at = Some(notified_at);
        self
    }
}
