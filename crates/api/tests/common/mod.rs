//! Shared helpers for the API integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ipa_api::auth::jwt::JwtConfig;
use ipa_api::config::{ServerConfig, StoreBackend};
use ipa_api::router::build_app_router;
use ipa_api::state::AppState;
use ipa_db::{MemoryStore, RecordStore, StoreError};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8081".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        store: StoreBackend::Memory,
        bootstrap_admin: None,
    }
}

pub fn test_state(store: Arc<dyn RecordStore>) -> AppState {
    AppState::new(store, test_config())
}

/// Build the full application router over the given store.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    build_app_router(test_state(store))
}

/// Bearer token for an account key and role, signed with the test secret.
pub fn token_for(account_key: &str, role: &str) -> String {
    test_config()
        .jwt
        .issue(account_key, role)
        .expect("token generation")
}

pub fn admin_token() -> String {
    token_for("admin_ipa_cat", "Admin")
}

pub fn profesor_token() -> String {
    token_for("marta_ipa_cat", "Profesor")
}

pub fn student_token() -> String {
    token_for("ana_ipa_cat", "Estudiante")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should be handled")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_auth(app, "POST", uri, body, token).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_auth(app, "PUT", uri, body, token).await
}

async fn json_auth(app: Router, method: &str, uri: &str, body: Value, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_text_auth(app: Router, uri: &str, text: &str, token: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "text/plain; charset=utf-8")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(text.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with no body and no `content-type` header.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::delete(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryStore`] and fails `set` calls under `prefix` once
/// `allowed` of them have succeeded. Every other call passes through.
pub struct FailingStore {
    pub inner: Arc<MemoryStore>,
    prefix: String,
    allowed: usize,
    seen: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<MemoryStore>, prefix: &str, allowed: usize) -> Self {
        Self {
            inner,
            prefix: prefix.to_string(),
            allowed,
            seen: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        if path.starts_with(&self.prefix) {
            let n = self.seen.fetch_add(1, Ordering::SeqCst);
            if n >= self.allowed {
                return Err(StoreError::Unavailable(format!("injected failure writing {path}")));
            }
        }
        self.inner.set(path, value).await
    }

    async fn update(&self, base: &str, entries: BTreeMap<String, Value>) -> Result<(), StoreError> {
        self.inner.update(base, entries).await
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.inner.remove(path).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}
