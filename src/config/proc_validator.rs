//! Configuration validation with aggregated errors.
//! Every problem is collected into a `Vec<String>` so an operator sees all
//! of them at once instead of fixing one per restart.

use tracing::{error, info};

use crate::config::notifier::{AuthConfig, IndexingConfig, RotationConfig, ServiceConfig, StorageConfig};
use crate::config::settings::SettingsConfig;

const ALLOWED_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_indexing(&cfg.indexing, &mut errors);
    validate_auth(&cfg.auth, &mut errors);
    validate_storage(&cfg.storage, &mut errors);
    validate_rotation(&cfg.rotation, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        if !ALLOWED_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, ALLOWED_LOG_LEVELS
            ));
        }
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!("settings.server.port '{}' is not a valid port", settings.server.port));
    }
}

fn validate_indexing(indexing: &IndexingConfig, errors: &mut Vec<String>) {
    if !is_http_url(&indexing.endpoint) {
        errors.push(format!("indexing.endpoint '{}' must be an http(s) url", indexing.endpoint));
    }
    if indexing.timeout_seconds == 0 {
        errors.push("indexing.timeout_seconds must be > 0".to_owned());
    }
}

fn validate_auth(auth: &AuthConfig, errors: &mut Vec<String>) {
    if !is_http_url(&auth.token_url) {
        errors.push(format!("auth.token_url '{}' must be an http(s) url", auth.token_url));
    }
    if auth.timeout_seconds == 0 {
        errors.push("auth.timeout_seconds must be > 0".to_owned());
    }
    if auth.scopes.is_empty() || auth.scopes.iter().any(|s| s.trim().is_empty()) {
        errors.push("auth.scopes must contain at least one non-empty scope".to_owned());
    }
}

fn validate_storage(storage: &StorageConfig, errors: &mut Vec<String>) {
    if storage.path.trim().is_empty() {
        errors.push("storage.path must not be empty".to_owned());
    }
}

fn validate_rotation(rotation: &RotationConfig, errors: &mut Vec<String>) {
    if rotation.rotation_value_days <= 0 {
        errors.push(format!(
            "rotation.rotation_value_days must be a positive integer, got {}",
            rotation.rotation_value_days
        ));
    }
    if rotation.rotation_value_count <= 0 {
        errors.push(format!(
            "rotation.rotation_value_count must be a positive integer, got {}",
            rotation.rotation_value_count
        ));
    }
    if rotation.interval_seconds == 0 {
        errors.push("rotation.interval_seconds must be > 0".to_owned());
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
