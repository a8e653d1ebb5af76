//! Backend reachability probe.
//!
//! The probe fetches one canary secret through the provider. It goes through
//! the cache like any other read, so a healthy result may be served from a
//! cached value.

use crate::secrets::{SecretProvider, JWT_SECRET_NAME};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResult {
    pub status: HealthStatus,
    pub backend_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResult {
    pub fn healthy(backend_label: &str) -> Self {
        Self {
            status: HealthStatus::Healthy,
            backend_label: backend_label.to_string(),
            error: None,
        }
    }

    pub fn unhealthy(backend_label: &str, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            backend_label: backend_label.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

pub struct HealthProbe {
    provider: Arc<SecretProvider>,
    canary: String,
}

impl HealthProbe {
    /// Probe using the JWT signing secret as canary.
    pub fn new(provider: Arc<SecretProvider>) -> Self {
        Self {
            provider,
            canary: JWT_SECRET_NAME.to_string(),
        }
    }

    pub async fn check(&self) -> HealthResult {
        match self.provider.get_secret(&self.canary).await {
            Ok(_) => HealthResult::healthy(self.provider.label()),
            Err(e) => {
                warn!("Health probe failed on {}: {}", self.canary, e);
                HealthResult::unhealthy(self.provider.label(), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::provider::test_support::ScriptedSource;

    #[tokio::test]
    async fn healthy_when_canary_resolves() {
        let source = Arc::new(ScriptedSource::with_required());
        let provider = Arc::new(SecretProvider::new(source, None));

        let result = HealthProbe::new(provider).check().await;
        assert!(result.is_healthy());
        assert_eq!(result.backend_label, "scripted");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn unhealthy_when_canary_fails() {
        let source = Arc::new(ScriptedSource::with_required());
        source.fail(JWT_SECRET_NAME);
        let provider = Arc::new(SecretProvider::new(source, None));

        let result = HealthProbe::new(provider).check().await;
        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert!(result.error.unwrap().contains("403"));
    }

    #[tokio::test]
    async fn cached_canary_skips_backend() {
        let source = Arc::new(ScriptedSource::with_required());
        let provider = Arc::new(SecretProvider::new(source.clone(), None));
        let probe = HealthProbe::new(provider);

        probe.check().await;
        source.fail(JWT_SECRET_NAME);
        assert!(probe.check().await.is_healthy());
        assert_eq!(source.calls_for(JWT_SECRET_NAME), 1);
    }

    #[test]
    fn serializes_without_empty_error() {
        let json = serde_json::to_value(HealthResult::healthy("expenses-kv")).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["backendLabel"], "expenses-kv");
        assert!(json.get("error").is_none());
    }
}
