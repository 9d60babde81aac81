use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use tokio::time::Instant;

use crate::utils::constants::{DEFAULT_TOKEN_SAFETY_MARGIN_SECS, MIN_TOKEN_CACHE_LIFETIME_SECS};

/// Fixed-width UTC layout used for `notified_at`; lexical order equals time order.
const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn get_token_safety_margin_seconds(safety_margin_seconds: Option<u64>) -> u64 {
    safety_margin_seconds.unwrap_or(DEFAULT_TOKEN_SAFETY_MARGIN_SECS)
}

/// Effective cache lifetime for a freshly issued token: `max(60, expires_in - margin)`.
pub fn token_cache_lifetime_seconds(expires_in: i64, safety_margin_seconds: u64) -> i64 {
    let margin = i64::try_from(safety_margin_seconds).unwrap_or(i64::MAX);
    let lifetime = expires_in.saturating_sub(margin);
    lifetime.max(MIN_TOKEN_CACHE_LIFETIME_SECS)
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// `None` when the cutoff falls outside the representable range.
pub fn days_ago(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|delta| now.checked_sub_signed(delta))
}

/// `fetched_at + seconds`, saturating at the latest representable instant.
pub fn expiry_after(fetched_at: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| fetched_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

pub fn from_db_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, DB_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
