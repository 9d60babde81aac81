use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;
use crate::credentials::CredentialError;

/// Symbolic log statuses for attempts that never got an HTTP status back.
pub mod status {
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const JSON_ERROR: &str = "JSON_ERROR";
    pub const TOKEN_ERROR: &str = "TOKEN_ERROR";
    pub const AUTH_EXCEPTION: &str = "AUTH_EXCEPTION";
    pub const GENERAL_EXCEPTION_AUTH: &str = "GENERAL_EXCEPTION_AUTH";
    pub const TOKEN_UNAVAILABLE: &str = "TOKEN_UNAVAILABLE";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
}

/// Why a dispatch failed. The `Display` text is what lands in the log.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Service account JSON not configured.")]
    ConfigMissing,
    #[error("Invalid service account JSON: {0}")]
    MalformedCredential(CredentialError),
    #[error("{}", auth_message(.0))]
    Auth(#[from] AuthError),
    #[error("Access token is unavailable for API request.")]
    TokenUnavailable,
    #[error("{0}")]
    PublishTransport(String),
    #[error("API Error: Unauthorized (access token may be invalid or expired). Token cache cleared.")]
    Unauthorized,
    #[error("{message}")]
    Api {
        status: u16,
        body: Option<Value>,
        message: String,
    },
}

impl From<CredentialError> for DispatchError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmptyInput => DispatchError::ConfigMissing,
            other => DispatchError::MalformedCredential(other),
        }
    }
}

impl DispatchError {
    /// Stable tag written to the log's status column.
    pub fn status_tag(&self) -> String {
        match self {
            DispatchError::ConfigMissing => status::CONFIG_ERROR.to_owned(),
            DispatchError::MalformedCredential(_) => status::JSON_ERROR.to_owned(),
            DispatchError::Auth(AuthError::Denied(_)) => status::TOKEN_ERROR.to_owned(),
            DispatchError::Auth(AuthError::Protocol(_)) => status::AUTH_EXCEPTION.to_owned(),
            DispatchError::Auth(AuthError::Transport(_) | AuthError::InvalidKey(_)) => {
                status::GENERAL_EXCEPTION_AUTH.to_owned()
            }
            DispatchError::TokenUnavailable => status::TOKEN_UNAVAILABLE.to_owned(),
            DispatchError::PublishTransport(_) => status::REMOTE_ERROR.to_owned(),
            DispatchError::Unauthorized => "401".to_owned(),
            DispatchError::Api { status, .. } => status.to_string(),
        }
    }

    /// HTTP status from the indexing endpoint, when one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            DispatchError::Unauthorized => Some(401),
            DispatchError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::Denied(detail) => format!("Failed to fetch access token. {}", detail),
        AuthError::Protocol(detail) => format!("OAuth2 error: {}", detail),
        AuthError::Transport(detail) | AuthError::InvalidKey(detail) => {
            format!("Exception during auth: {}", detail)
        }
    }
}
