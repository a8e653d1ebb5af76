//! Integration tests for the configuration API routes.
//!
//! Routes are driven in-process with `tower::ServiceExt::oneshot` against a
//! resolver backed by an in-memory secret source.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use expense_config::api::{routes::build_routes, ApiState};
use expense_config::config::{ResolutionMode, Settings};
use expense_config::resolver::ConfigResolver;
use expense_config::secrets::{
    SecretSource, DB_PASSWORD_NAME, JWT_SECRET_NAME, TELEMETRY_CONNECTION_STRING_NAME,
};
use expense_config::Error;

// ============================================================================
// Test Helpers
// ============================================================================

/// In-memory backend that can be switched off.
struct MemorySource {
    values: Mutex<HashMap<String, String>>,
    down: Mutex<bool>,
}

impl MemorySource {
    fn new() -> Self {
        let values: HashMap<String, String> = [
            (JWT_SECRET_NAME, "vault-jwt-secret"),
            (DB_PASSWORD_NAME, "p@ss"),
            (TELEMETRY_CONNECTION_STRING_NAME, "InstrumentationKey=vault"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            values: Mutex::new(values),
            down: Mutex::new(false),
        }
    }

    fn set_down(&self, down: bool) {
        *self.down.lock() = down;
    }

    fn rotate(&self, name: &str, value: &str) {
        self.values.lock().insert(name.to_string(), value.to_string());
    }
}

#[async_trait]
impl SecretSource for MemorySource {
    fn label(&self) -> &str {
        "memory-vault"
    }

    async fn fetch(&self, name: &str) -> expense_config::Result<String> {
        if *self.down.lock() {
            return Err(Error::SourceUnavailable {
                name: name.to_string(),
                cause: "connection refused".to_string(),
            });
        }
        let value = self.values.lock().get(name).cloned();
        value.ok_or_else(|| Error::SourceUnavailable {
            name: name.to_string(),
            cause: "not found".to_string(),
        })
    }
}

fn settings(mode: ResolutionMode) -> Settings {
    Settings {
        mode,
        environment: "test".into(),
        database_url: Some("postgresql://admin@db.example.com/expenses".into()),
        jwt_secret: Some("env-jwt-secret".into()),
        ..Settings::default()
    }
}

async fn remote_state(source: Arc<MemorySource>) -> ApiState {
    let resolver = ConfigResolver::with_source(settings(ResolutionMode::RemoteBacked), source);
    resolver.initialize().await;
    ApiState::new(Arc::new(resolver))
}

async fn send(state: ApiState, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = build_routes(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn health_is_ok_when_backend_reachable() {
    let state = remote_state(Arc::new(MemorySource::new())).await;

    let (status, body) = send(state, "GET", "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["secretBackend"]["status"], "healthy");
    assert_eq!(body["secretBackend"]["backendLabel"], "memory-vault");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_503_when_backend_down_and_cache_empty() {
    let source = Arc::new(MemorySource::new());
    source.set_down(true);
    let state = remote_state(source).await;

    let (status, body) = send(state, "GET", "/api/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["secretBackend"]["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn security_info_never_exposes_secrets() {
    let state = remote_state(Arc::new(MemorySource::new())).await;

    let (status, body) = send(state, "GET", "/api/security-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["secretBackend"]["name"], "memory-vault");
    assert_eq!(body["authentication"]["jwtEnabled"], true);
    assert_eq!(body["authentication"]["tokenExpiry"], "7d");
    assert!(!body.to_string().contains("vault-jwt-secret"));
}

#[tokio::test]
async fn security_info_before_initialize_is_500() {
    let resolver = ConfigResolver::new(settings(ResolutionMode::EnvironmentBacked));
    let state = ApiState::new(Arc::new(resolver));

    let (status, body) = send(state, "GET", "/api/security-info").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("not initialized"));
}

#[tokio::test]
async fn refresh_picks_up_rotated_secret() {
    let source = Arc::new(MemorySource::new());
    let state = remote_state(source.clone()).await;
    let resolver = state.resolver.clone();

    source.rotate(JWT_SECRET_NAME, "rotated-jwt-secret");
    let (status, body) = send(state, "POST", "/api/refresh-secrets").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        resolver.get_config().unwrap().jwt_secret.as_deref(),
        Some("rotated-jwt-secret")
    );
}

#[tokio::test]
async fn refresh_failure_returns_error_json() {
    let source = Arc::new(MemorySource::new());
    let state = remote_state(source.clone()).await;

    source.set_down(true);
    let (status, body) = send(state, "POST", "/api/refresh-secrets").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn refresh_in_environment_mode_is_rejected() {
    let resolver = ConfigResolver::new(settings(ResolutionMode::EnvironmentBacked));
    resolver.initialize().await;
    let state = ApiState::new(Arc::new(resolver));

    let (status, body) = send(state, "POST", "/api/refresh-secrets").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("never constructed"));
}

#[tokio::test]
async fn fallback_still_serves_requests() {
    let source = Arc::new(MemorySource::new());
    source.set_down(true);
    let state = remote_state(source).await;
    let snapshot = state.resolver.get_config().unwrap();
    assert_eq!(snapshot.secret_backend_label, "fallback-env-vars");
    assert_eq!(snapshot.jwt_secret.as_deref(), Some("env-jwt-secret"));

    let (status, body) = send(state, "GET", "/api/security-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["secretBackend"]["status"], "degraded");
    assert_eq!(body["state"], "fallbackReady");
}

#[tokio::test]
async fn security_info_is_served_as_json() {
    let state = remote_state(Arc::new(MemorySource::new())).await;

    let response = build_routes(state)
        .oneshot(
            Request::builder()
                .uri("/api/security-info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body.is_object());
    assert_eq!(body["state"], "ready");
    assert_eq!(body["monitoring"]["telemetryEnabled"], true);
}
