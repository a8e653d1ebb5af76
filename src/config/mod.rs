mod defaults;
mod validation;

pub use defaults::*;
pub use validation::*;

use crate::error::{Error, Result};
use crate::secrets::redact_secret;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Where the resolver sources secrets from. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionMode {
    RemoteBacked,
    EnvironmentBacked,
}

impl ResolutionMode {
    pub fn from_toggle(use_secret_backend: bool) -> Self {
        if use_secret_backend {
            ResolutionMode::RemoteBacked
        } else {
            ResolutionMode::EnvironmentBacked
        }
    }
}

/// Connection settings for the remote secret backend.
#[derive(Clone)]
pub struct BackendSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Explicit label; derived from the URL host when unset.
    pub name: Option<String>,
    pub fetch_timeout: Duration,
}

impl BackendSettings {
    /// Human-readable backend label used in snapshots and health reports.
    ///
    /// `https://expenses-kv.vault.azure.net/` yields `expenses-kv`.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.url
            .as_deref()
            .and_then(|raw| url::Url::parse(raw).ok())
            .and_then(|u| u.host_str().map(|h| h.split('.').next().unwrap_or(h).to_string()))
            .unwrap_or_else(|| "secret-backend".to_string())
    }
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_deref().map(redact_secret))
            .field("name", &self.name)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            name: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

/// Process settings read from the environment at startup.
///
/// The secret-bearing fields double as the fallback values used when the
/// remote backend is disabled or unreachable.
#[derive(Clone)]
pub struct Settings {
    pub mode: ResolutionMode,
    pub backend: BackendSettings,
    pub port: u16,
    pub environment: String,
    /// Full URL in environment mode, password-less template in remote mode.
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_expires_in: String,
    pub telemetry_connection_string: Option<String>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        let settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            "Loaded settings: mode={:?}, environment={}, port={}",
            settings.mode, settings.environment, settings.port
        );
        Ok(settings)
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let use_backend = get(ENV_USE_SECRET_BACKEND)
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let port = match get(ENV_PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| Error::InvalidSettings(format!("{ENV_PORT}={raw}: {e}")))?,
            None => DEFAULT_PORT,
        };

        let fetch_timeout = match get(ENV_SECRET_FETCH_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                Error::InvalidSettings(format!("{ENV_SECRET_FETCH_TIMEOUT_SECS}={raw}: {e}"))
            })?),
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        Ok(Self {
            mode: ResolutionMode::from_toggle(use_backend),
            backend: BackendSettings {
                url: get(ENV_SECRET_BACKEND_URL),
                token: get(ENV_SECRET_BACKEND_TOKEN),
                name: get(ENV_SECRET_BACKEND_NAME),
                fetch_timeout,
            },
            port,
            environment: get(ENV_NODE_ENV).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            database_url: get(ENV_DATABASE_URL),
            jwt_secret: get(ENV_JWT_SECRET),
            jwt_expires_in: get(ENV_JWT_EXPIRES_IN)
                .unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string()),
            telemetry_connection_string: get(ENV_TELEMETRY_CONNECTION_STRING),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ResolutionMode::EnvironmentBacked,
            backend: BackendSettings::default(),
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            database_url: None,
            jwt_secret: None,
            jwt_expires_in: DEFAULT_JWT_EXPIRES_IN.to_string(),
            telemetry_connection_string: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("mode", &self.mode)
            .field("backend", &self.backend)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("database_url", &self.database_url.is_some())
            .field("jwt_secret", &self.jwt_secret.as_deref().map(redact_secret))
            .field("jwt_expires_in", &self.jwt_expires_in)
            .field(
                "telemetry_connection_string",
                &self.telemetry_connection_string.is_some(),
            )
            .finish()
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
