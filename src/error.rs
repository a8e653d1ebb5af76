//! Error taxonomy for secret resolution and configuration assembly.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The backend could not be reached, refused the credentials, or timed out.
    #[error("secret backend unavailable for '{name}': {cause}")]
    SourceUnavailable { name: String, cause: String },

    /// At least one required secret could not be loaded; no partial result exists.
    #[error("required secrets unavailable: {source}")]
    SecretsUnavailable {
        #[source]
        source: Box<Error>,
    },

    /// Configuration was read or refreshed before its prerequisites existed.
    #[error("configuration not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("invalid database URL template: {0}")]
    InvalidDatabaseUrl(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl Error {
    pub(crate) fn source_unavailable(name: &str, cause: impl ToString) -> Self {
        Error::SourceUnavailable {
            name: name.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Whether this error is a backend outage that the resolver recovers from.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. } | Error::SecretsUnavailable { .. }
        )
    }
}
