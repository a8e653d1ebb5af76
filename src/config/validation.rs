use super::{ResolutionMode, Settings};
use tracing::warn;

/// A single problem found in the startup settings.
#[derive(Debug, Clone)]
pub struct SettingsValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SettingsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate startup settings.
///
/// Problems that the resolver can survive through fallback (a missing token,
/// a missing fallback JWT secret) are logged, not returned.
pub fn validate_settings(settings: &Settings) -> Vec<SettingsValidationError> {
    let mut errors = Vec::new();

    if settings.port == 0 {
        errors.push(SettingsValidationError {
            path: "PORT".to_string(),
            message: "Port must be greater than 0".to_string(),
        });
    }

    if settings.backend.fetch_timeout.is_zero() {
        errors.push(SettingsValidationError {
            path: "SECRET_FETCH_TIMEOUT_SECS".to_string(),
            message: "Fetch timeout must be greater than 0".to_string(),
        });
    }

    if settings.mode == ResolutionMode::RemoteBacked {
        match settings.backend.url.as_deref() {
            None => errors.push(SettingsValidationError {
                path: "SECRET_BACKEND_URL".to_string(),
                message: "Secret backend URL is required when USE_SECRET_BACKEND is on"
                    .to_string(),
            }),
            Some(raw) => match url::Url::parse(raw) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(SettingsValidationError {
                    path: "SECRET_BACKEND_URL".to_string(),
                    message: format!("Unsupported scheme '{}'", parsed.scheme()),
                }),
                Err(e) => errors.push(SettingsValidationError {
                    path: "SECRET_BACKEND_URL".to_string(),
                    message: format!("Not a valid URL: {e}"),
                }),
            },
        }

        if settings.backend.token.is_none() {
            warn!("Secret backend enabled but SECRET_BACKEND_TOKEN is not set");
        }

        if settings.database_url.is_none() {
            errors.push(SettingsValidationError {
                path: "DATABASE_URL".to_string(),
                message: "Database URL template is required when USE_SECRET_BACKEND is on"
                    .to_string(),
            });
        }
    }

    if settings.jwt_secret.is_none() {
        warn!("JWT_SECRET is not set; environment fallback will have no signing key");
    }

    errors
}
