//! Shared constants and invariants

pub const DEFAULT_TOKEN_SAFETY_MARGIN_SECS: u64 = 300;
/// Cached tokens never live shorter than this, whatever the provider says.
pub const MIN_TOKEN_CACHE_LIFETIME_SECS: i64 = 60;
/// Used when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_EXPIRES_IN_SECS: i64 = 3599;
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_INDEXING_ENDPOINT: &str = "https://indexing.googleapis.com/v3/urlNotifications:publish";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

pub const DEFAULT_ROTATION_DAYS: i64 = 30;
pub const DEFAULT_ROTATION_COUNT: i64 = 1000;
pub const DEFAULT_ROTATION_INTERVAL_SECS: u64 = 86_400;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 1000;
pub const MAX_ERROR_MESSAGE_WORDS: usize = 50;
