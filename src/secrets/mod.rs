//! Remote secret access.
//!
//! [`SecretSource`] performs a single authenticated fetch, [`SecretCache`]
//! holds values for a fixed TTL, and [`SecretProvider`] combines the two into
//! cache-first lookups with bounded fetch latency.

pub mod cache;
pub mod database_url;
pub mod provider;
pub mod source;
pub mod types;

pub use cache::SecretCache;
pub use database_url::splice_password;
pub use provider::SecretProvider;
pub use source::HttpSecretSource;
pub use types::{
    redact_secret, RequiredSecrets, SecretSource, DB_PASSWORD_NAME, JWT_SECRET_NAME,
    TELEMETRY_CONNECTION_STRING_NAME,
};
