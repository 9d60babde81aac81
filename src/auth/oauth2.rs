use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::notifier::AuthConfig;
use crate::credentials::ServiceAccountCredential;
use crate::helpers::time::{get_instant, now_i64};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{ASSERTION_LIFETIME_SECS, DEFAULT_TOKEN_EXPIRES_IN_SECS, JWT_BEARER_GRANT};

static OK_MSG: &str = "ok";

/// Failures while exchanging the key for a bearer token, kept apart from
/// publish-time failures so the log shows where things broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("token endpoint unreachable: {0}")]
    Transport(String),
    #[error("malformed token endpoint response: {0}")]
    Protocol(String),
    #[error("token request denied: {0}")]
    Denied(String),
    #[error("cannot sign token assertion: {0}")]
    InvalidKey(String),
}

impl AuthError {
    fn reason(&self) -> &'static str {
        match self {
            AuthError::Transport(_) => "transport",
            AuthError::Protocol(_) => "protocol",
            AuthError::Denied(_) => "denied",
            AuthError::InvalidKey(_) => "invalid_key",
        }
    }
}

/// Token as issued by the provider, before caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

pub trait FetchAccessToken: Send + Sync {
    fn fetch_token(
        &self,
        credential: &ServiceAccountCredential,
    ) -> impl std::future::Future<Output = Result<TokenResponse, AuthError>> + Send;
}

/// JWT assertion claims for the service-account grant
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

/// Standard OAuth2 token endpoint payload, success or error shape.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges a service-account key for a bearer token (RFC 7523 JWT bearer grant).
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    token_url: String,
    scope: String,
}

impl AuthClient {
    pub fn new(cfg: &AuthConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            token_url: cfg.token_url.clone(),
            scope: cfg.scopes.join(" "),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn sign_assertion(&self, credential: &ServiceAccountCredential) -> Result<String, AuthError> {
        let iat = now_i64();
        let claims = Claims {
            iss: credential.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.token_url.clone(),
            exp: iat + ASSERTION_LIFETIME_SECS,
            iat,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(credential.private_key_id.clone());
        let encoding_key = EncodingKey::from_rsa_pem(credential.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

        encode(&header, &claims, &encoding_key).map_err(|e| AuthError::InvalidKey(e.to_string()))
    }

    async fn exchange(&self, credential: &ServiceAccountCredential) -> Result<TokenResponse, AuthError> {
        let assertion = self.sign_assertion(credential)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        parse_token_response(status, &body)
    }
}

impl FetchAccessToken for AuthClient {
    async fn fetch_token(&self, credential: &ServiceAccountCredential) -> Result<TokenResponse, AuthError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self.exchange(credential).await;
        metrics.token_fetch_duration.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(token) => {
                metrics.token_fetches.with_label_values(&[OK_MSG]).inc();
                debug!(expires_in = token.expires_in, "fetched access token for {}", credential.client_email);
            }
            Err(err) => {
                metrics.token_fetches.with_label_values(&[err.reason()]).inc();
                warn!(error = %err, "access token fetch failed for {}", credential.client_email);
            }
        }
        result
    }
}

/// Classify a token endpoint reply.
pub fn parse_token_response(status: StatusCode, body: &str) -> Result<TokenResponse, AuthError> {
    let payload: TokenEndpointResponse = serde_json::from_str(body).map_err(|e| {
        AuthError::Protocol(format!("HTTP {}: {} ({})", status.as_u16(), e, snippet(body)))
    })?;

    if let Some(access_token) = payload.access_token {
        return Ok(TokenResponse {
            access_token,
            expires_in: payload.expires_in.unwrap_or(DEFAULT_TOKEN_EXPIRES_IN_SECS),
        });
    }

    if let Some(description) = payload.error_description {
        return Err(AuthError::Denied(format!("Description: {}", description)));
    }
    if let Some(error) = payload.error {
        return Err(AuthError::Denied(format!("Error: {}", error)));
    }

    Err(AuthError::Protocol(format!(
        "HTTP {}: response carries neither access_token nor error",
        status.as_u16()
    )))
}

fn snippet(body: &str) -> String {
    body.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_payload_defaults_expiry() {
        let token = parse_token_response(StatusCode::OK, r#"{"access_token":"ya29.a","token_type":"Bearer"}"#).unwrap();
        assert_eq!(token, TokenResponse { access_token: "ya29.a".into(), expires_in: 3599 });

        let token = parse_token_response(StatusCode::OK, r#"{"access_token":"ya29.b","expires_in":1200}"#).unwrap();
        assert_eq!(token.expires_in, 1200);
    }

    #[test]
    fn error_payload_is_denied_and_prefers_description() {
        let err = parse_token_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#,
        )
        .unwrap_err();
        assert_eq!(err, AuthError::Denied("Description: Invalid JWT Signature.".into()));

        let err = parse_token_response(StatusCode::BAD_REQUEST, r#"{"error":"invalid_client"}"#).unwrap_err();
        assert_eq!(err, AuthError::Denied("Error: invalid_client".into()));
    }

    #[test]
    fn unexpected_shapes_are_protocol_errors() {
        assert!(matches!(
            parse_token_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            Err(AuthError::Protocol(_))
        ));
        assert!(matches!(
            parse_token_response(StatusCode::OK, r#"{"token_type":"Bearer"}"#),
            Err(AuthError::Protocol(_))
        ));
    }
}
