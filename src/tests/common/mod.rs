// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use reqwest::Client;

use crate::auth::{AuthClient, AuthError, FetchAccessToken, TokenResponse};
use crate::cache::TokenCache;
use crate::config::notifier::ServiceConfig;
use crate::credentials::{self, ServiceAccountCredential};
use crate::dispatch::NotificationDispatcher;
use crate::store::LogStore;

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");
pub const TEST_CLIENT_EMAIL: &str = "indexer@test-project.iam.gserviceaccount.com";
pub const TEST_KEY_ID: &str = "0123456789abcdef0123456789abcdef01234567";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// A port nothing listens on.
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

/// Service-account key JSON signed with the fixture RSA key.
pub fn service_account_json() -> String {
    json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": TEST_KEY_ID,
        "private_key": TEST_PRIVATE_KEY,
        "client_email": TEST_CLIENT_EMAIL,
        "client_id": "101010101010101010101",
        "token_uri": "https://oauth2.googleapis.com/token"
    })
    .to_string()
}

pub fn test_credential() -> ServiceAccountCredential {
    credentials::parse(&service_account_json()).expect("fixture credential")
}

pub fn token_body(access_token: &str, expires_in: i64) -> String {
    json!({"access_token": access_token, "expires_in": expires_in, "token_type": "Bearer"}).to_string()
}

pub fn publish_body(url: &str) -> String {
    json!({
        "urlNotificationMetadata": {
            "url": url,
            "latestUpdate": {"url": url, "type": "URL_UPDATED", "notifyTime": "2025-03-01T12:00:00.000Z"}
        }
    })
    .to_string()
}

pub fn test_config(token_url: &str, endpoint: &str) -> ServiceConfig {
    let mut cfg = ServiceConfig::default();
    cfg.auth.token_url = token_url.to_owned();
    cfg.auth.timeout_seconds = 2;
    cfg.indexing.endpoint = endpoint.to_owned();
    cfg.indexing.timeout_seconds = 2;
    cfg
}

/// Dispatcher over an in-memory store with the given raw credential JSON.
pub fn build_dispatcher(cfg: &ServiceConfig, credentials: Option<String>) -> NotificationDispatcher {
    let store = Arc::new(LogStore::open_in_memory().expect("in-memory store"));
    let auth = AuthClient::new(&cfg.auth).expect("auth client");
    NotificationDispatcher::new(
        &cfg.indexing,
        Arc::new(credentials),
        auth,
        TokenCache::new(cfg.auth.safety_margin_seconds),
        store,
    )
    .expect("dispatcher")
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

struct ScriptState {
    queue: VecDeque<(u16, String)>,
    fallback: (u16, String),
    delay: Option<Duration>,
    requests: Vec<RecordedRequest>,
}

/// POST endpoint that replays queued replies, then a fixed one, and
/// records every request it sees.
#[derive(Clone)]
pub struct ScriptedEndpoint {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedEndpoint {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                queue: VecDeque::new(),
                fallback: (status, body.into()),
                delay: None,
                requests: Vec::new(),
            })),
        }
    }

    /// Reply once with this before falling back.
    pub fn then_once(&self, status: u16, body: impl Into<String>) -> &Self {
        self.state.lock().unwrap().queue.push_back((status, body.into()));
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Serve on an ephemeral port; returns the full URL of `path`.
    pub async fn serve(&self, path: &str) -> (JoinHandle<()>, String) {
        let router = Router::new().route(path, post(scripted_reply)).with_state(self.clone());
        let (handle, addr) = spawn_axum(router).await;
        (handle, format!("http://{}{}", addr, path))
    }
}

async fn scripted_reply(
    State(endpoint): State<ScriptedEndpoint>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let ((status, reply), delay) = {
        let mut state = endpoint.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            authorization: header_value(&headers, header::AUTHORIZATION),
            content_type: header_value(&headers, header::CONTENT_TYPE),
            body,
        });
        let reply = match state.queue.pop_front() {
            Some(reply) => reply,
            None => state.fallback.clone(),
        };
        (reply, state.delay)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

/// In-process token fetcher with a fixed reply.
#[derive(Clone)]
pub struct FakeFetcher {
    calls: Arc<AtomicUsize>,
    reply: Arc<Mutex<Result<TokenResponse, AuthError>>>,
}

impl FakeFetcher {
    pub fn issuing(access_token: &str, expires_in: i64) -> Self {
        Self::replying(Ok(TokenResponse { access_token: access_token.to_owned(), expires_in }))
    }

    pub fn replying(reply: Result<TokenResponse, AuthError>) -> Self {
        Self { calls: Arc::new(AtomicUsize::new(0)), reply: Arc::new(Mutex::new(reply)) }
    }

    pub fn set_reply(&self, reply: Result<TokenResponse, AuthError>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchAccessToken for FakeFetcher {
    async fn fetch_token(&self, _credential: &ServiceAccountCredential) -> Result<TokenResponse, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.lock().unwrap().clone()
    }
}
