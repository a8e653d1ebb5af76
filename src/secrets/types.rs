//! Core types for the secrets subsystem.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

// ============================================================================
// Secret names
// ============================================================================

/// JWT signing key. Also used as the health canary.
pub const JWT_SECRET_NAME: &str = "JWT-SECRET";

/// Administrative password spliced into the database URL template.
pub const DB_PASSWORD_NAME: &str = "DB-ADMIN-PASSWORD";

/// Telemetry (Application Insights) connection string.
pub const TELEMETRY_CONNECTION_STRING_NAME: &str = "TELEMETRY-CONNECTION-STRING";

// ============================================================================
// Source trait
// ============================================================================

/// A remote store that can return the current value of a named secret.
///
/// Implementations must fold every transport or authorization failure into
/// [`Error::SourceUnavailable`](crate::error::Error::SourceUnavailable).
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Display name for logs and health reports.
    fn label(&self) -> &str;

    /// Fetch the current value of `name` from the backend.
    async fn fetch(&self, name: &str) -> Result<String>;
}

// ============================================================================
// Bulk result
// ============================================================================

/// The full set of required secrets, loaded together or not at all.
#[derive(Clone, PartialEq, Eq)]
pub struct RequiredSecrets {
    pub jwt_secret: String,
    pub db_password: String,
    pub telemetry_connection_string: String,
}

impl fmt::Debug for RequiredSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequiredSecrets")
            .field("jwt_secret", &redact_secret(&self.jwt_secret))
            .field("db_password", &redact_secret(&self.db_password))
            .field(
                "telemetry_connection_string",
                &redact_secret(&self.telemetry_connection_string),
            )
            .finish()
    }
}

/// Redact a secret value for display (show first 2 and last 2 chars).
pub fn redact_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}…{tail}")
}
