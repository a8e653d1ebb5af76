//! Remote secret source speaking the key-vault REST shape.
//!
//! `GET {base}/secrets/{name}?api-version=7.4` with a bearer token; the
//! response body carries the secret under `value`.

use super::types::SecretSource;
use crate::config::{BackendSettings, SECRET_API_VERSION};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

/// Fetches secrets over HTTPS from the configured backend.
pub struct HttpSecretSource {
    base_url: String,
    token: Option<String>,
    label: String,
    client: Client,
}

impl HttpSecretSource {
    pub fn new(base_url: String, token: Option<String>, label: String) -> Self {
        Self {
            base_url,
            token,
            label,
            client: Client::new(),
        }
    }

    /// Build a source from backend settings. Fails when no URL is configured.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self> {
        let base_url = settings.url.clone().ok_or_else(|| {
            Error::InvalidSettings("SECRET_BACKEND_URL is required for the secret backend".into())
        })?;
        url::Url::parse(&base_url)
            .map_err(|e| Error::InvalidSettings(format!("SECRET_BACKEND_URL: {e}")))?;
        Ok(Self::new(base_url, settings.token.clone(), settings.label()))
    }

    fn secret_url(&self, name: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/secrets/{name}?api-version={SECRET_API_VERSION}")
    }
}

#[async_trait]
impl SecretSource for HttpSecretSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(Error::source_unavailable(name, "secret name must not be empty"));
        }

        debug!("Fetching {} from {}", name, self.label);

        let mut request = self.client.get(self.secret_url(name));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to reach {} for {}: {}", self.label, name, e);
            Error::source_unavailable(name, e)
        })?;

        let status = response.status();
        // The response body is never copied into the cause.
        if !status.is_success() {
            error!("Secret backend returned {} for {}", status, name);
            return Err(Error::source_unavailable(name, format!("HTTP {status}")));
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| Error::source_unavailable(name, format!("invalid response body: {e}")))?;

        bundle
            .value
            .ok_or_else(|| Error::source_unavailable(name, "response has no value"))
    }
}
