use crate::api::server::ApiState;
use crate::resolver::HealthResult;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build all routes for the configuration API.
pub fn build_routes(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/security-info", get(security_info_handler))
        .route("/api/refresh-secrets", post(refresh_secrets_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub environment: String,
    pub uptime: u64,
    pub secret_backend: HealthResult,
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let backend = state.resolver.health_check().await;
    let environment = state
        .resolver
        .get_config()
        .map(|c| c.environment.clone())
        .unwrap_or_else(|_| state.resolver.settings().environment.clone());

    let code = if backend.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if backend.is_healthy() { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: now_rfc3339(),
        version: state.version.clone(),
        environment,
        uptime: state.start_time.elapsed().as_secs(),
        secret_backend: backend,
    };
    (code, Json(body))
}

// ============================================================================
// Security info
// ============================================================================

async fn security_info_handler(State(state): State<ApiState>) -> Response {
    match state.resolver.security_info() {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            error!("Security info unavailable: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Failed to retrieve security information",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Refresh
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn refresh_secrets_handler(State(state): State<ApiState>) -> impl IntoResponse {
    match state.resolver.refresh_secrets().await {
        Ok(snapshot) => {
            info!("Secrets refreshed via API from {}", snapshot.secret_backend_label);
            (
                StatusCode::OK,
                Json(RefreshResponse {
                    status: "success".to_string(),
                    message: format!("Secrets refreshed from {}", snapshot.secret_backend_label),
                    timestamp: Some(now_rfc3339()),
                    error: None,
                }),
            )
        }
        Err(e) => {
            error!("Secret refresh via API failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RefreshResponse {
                    status: "error".to_string(),
                    message: "Failed to refresh secrets".to_string(),
                    timestamp: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
