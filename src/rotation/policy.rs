use std::fmt;

/// Retention policy for the log table; exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// keep only the newest entry per subject
    LatestPerSubject,
    /// drop entries older than `days`; non-positive is a no-op
    MaxAge { days: i64 },
    /// keep the newest `count` entries; non-positive is a no-op
    MaxCount { count: i64 },
}

impl RetentionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            RetentionPolicy::LatestPerSubject => "latest_per_subject",
            RetentionPolicy::MaxAge { .. } => "days",
            RetentionPolicy::MaxCount { .. } => "count",
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionPolicy::LatestPerSubject => write!(f, "latest entry per subject"),
            RetentionPolicy::MaxAge { days } => write!(f, "entries newer than {} days", days),
            RetentionPolicy::MaxCount { count } => write!(f, "newest {} entries", count),
        }
    }
}
