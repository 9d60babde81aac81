use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Keys a service-account JSON must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
    "client_id",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Blank input means "not configured", not a broken key.
    #[error("service account JSON is empty")]
    EmptyInput,
    #[error("{0}")]
    MalformedJson(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("type must be \"service_account\" (got \"{0}\")")]
    WrongType(String),
}

/// Validated service-account key. Immutable once parsed.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountCredential {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub token_uri: Option<String>,
}

impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RawServiceAccount {
    #[serde(rename = "type")]
    account_type: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: Option<String>,
    client_email: Option<String>,
    client_id: Option<String>,
    token_uri: Option<String>,
}

impl RawServiceAccount {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "type" => &self.account_type,
            "project_id" => &self.project_id,
            "private_key_id" => &self.private_key_id,
            "private_key" => &self.private_key,
            "client_email" => &self.client_email,
            "client_id" => &self.client_id,
            _ => &None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Parse and validate a service-account key. Pure, no side effects.
pub fn parse(raw: &str) -> Result<ServiceAccountCredential, CredentialError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CredentialError::EmptyInput);
    }

    // key files are objects; a struct would also accept a positional array
    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| CredentialError::MalformedJson(e.to_string()))?;
    if !value.is_object() {
        return Err(CredentialError::MalformedJson("expected a JSON object".to_owned()));
    }
    let parsed: RawServiceAccount =
        serde_json::from_value(value).map_err(|e| CredentialError::MalformedJson(e.to_string()))?;

    for name in REQUIRED_FIELDS {
        if parsed.field(name).is_none() {
            return Err(CredentialError::MissingField(name));
        }
    }

    let account_type = parsed.account_type.unwrap_or_default();
    if account_type != SERVICE_ACCOUNT_TYPE {
        return Err(CredentialError::WrongType(account_type));
    }

    Ok(ServiceAccountCredential {
        project_id: parsed.project_id.unwrap_or_default(),
        private_key_id: parsed.private_key_id.unwrap_or_default(),
        private_key: parsed.private_key.unwrap_or_default(),
        client_email: parsed.client_email.unwrap_or_default(),
        client_id: parsed.client_id.unwrap_or_default(),
        token_uri: parsed.token_uri.filter(|v| !v.is_empty()),
    })
}
