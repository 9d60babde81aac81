use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::rotation::policy::RetentionPolicy;
use crate::utils::constants::{
    DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_INDEXING_ENDPOINT, DEFAULT_PUBLISH_TIMEOUT_SECS,
    DEFAULT_ROTATION_COUNT, DEFAULT_ROTATION_DAYS, DEFAULT_ROTATION_INTERVAL_SECS,
    DEFAULT_TOKEN_URL, INDEXING_SCOPE,
};


/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

/// ================================
/// Indexing endpoint
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct IndexingConfig {
    #[serde(default = "default_indexing_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_publish_timeout")]
    pub timeout_seconds: u64,
    /// subject kinds (e.g. `post`, `page`) the integration layer should notify for
    #[serde(default)]
    pub target_subject_types: Vec<String>,
}

impl IndexingConfig {
    /// Empty allow-list targets nothing.
    pub fn is_target_subject_type(&self, kind: &str) -> bool {
        self.target_subject_types.iter().any(|t| t == kind)
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_indexing_endpoint(),
            timeout_seconds: default_publish_timeout(),
            target_subject_types: Vec::new(),
        }
    }
}

/// ================================
/// OAuth2 service-account auth
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_auth_timeout")]
    pub timeout_seconds: u64,
    pub safety_margin_seconds: Option<u64>,
    pub credentials: Option<CredentialValue>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            scopes: default_scopes(),
            timeout_seconds: default_auth_timeout(),
            safety_margin_seconds: None,
            credentials: None,
        }
    }
}

/// Where the service-account key JSON comes from
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum CredentialValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

/// ================================
/// Log storage
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default)]
    pub delete_data_on_uninstall: YesNo,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_storage_path(), delete_data_on_uninstall: YesNo::No }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

/// ================================
/// Log rotation
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct RotationConfig {
    #[serde(default)]
    pub rotation_type: RotationType,
    #[serde(default = "default_rotation_days")]
    pub rotation_value_days: i64,
    #[serde(default = "default_rotation_count")]
    pub rotation_value_count: i64,
    #[serde(default = "default_rotation_interval")]
    pub interval_seconds: u64,
}

impl RotationConfig {
    /// The single active retention policy.
    pub fn policy(&self) -> RetentionPolicy {
        match self.rotation_type {
            RotationType::LatestPerSubject => RetentionPolicy::LatestPerSubject,
            RotationType::Days => RetentionPolicy::MaxAge { days: self.rotation_value_days },
            RotationType::Count => RetentionPolicy::MaxCount { count: self.rotation_value_count },
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_type: RotationType::default(),
            rotation_value_days: default_rotation_days(),
            rotation_value_count: default_rotation_count(),
            interval_seconds: default_rotation_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RotationType {
    #[default]
    #[serde(alias = "latest_per_post")]
    LatestPerSubject,
    Days,
    Count,
}

fn default_indexing_endpoint() -> String {
    DEFAULT_INDEXING_ENDPOINT.to_owned()
}

fn default_publish_timeout() -> u64 {
    DEFAULT_PUBLISH_TIMEOUT_SECS
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

fn default_scopes() -> Vec<String> {
    vec![INDEXING_SCOPE.to_owned()]
}

fn default_auth_timeout() -> u64 {
    DEFAULT_AUTH_TIMEOUT_SECS
}

fn default_storage_path() -> String {
    "index-notifier.db".to_owned()
}

fn default_rotation_days() -> i64 {
    DEFAULT_ROTATION_DAYS
}

fn default_rotation_count() -> i64 {
    DEFAULT_ROTATION_COUNT
}

fn default_rotation_interval() -> u64 {
    DEFAULT_ROTATION_INTERVAL_SECS
}
