//! Default configuration constants used across the system.

use std::time::Duration;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default environment name.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default JWT lifetime, in the `jsonwebtoken`/`ms` shorthand the API uses.
pub const DEFAULT_JWT_EXPIRES_IN: &str = "7d";

/// Lifetime of every cached secret (5 minutes).
pub const SECRET_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Default upper bound on a single backend fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Key-vault REST API version sent with every secret request.
pub const SECRET_API_VERSION: &str = "7.4";

/// Backend label used when the process runs on environment variables by choice.
pub const ENV_BACKEND_LABEL: &str = "env-vars";

/// Backend label used after a remote backend failure.
pub const FALLBACK_BACKEND_LABEL: &str = "fallback-env-vars";

/// Environment variable names.
pub const ENV_USE_SECRET_BACKEND: &str = "USE_SECRET_BACKEND";
pub const ENV_SECRET_BACKEND_URL: &str = "SECRET_BACKEND_URL";
pub const ENV_SECRET_BACKEND_TOKEN: &str = "SECRET_BACKEND_TOKEN";
pub const ENV_SECRET_BACKEND_NAME: &str = "SECRET_BACKEND_NAME";
pub const ENV_SECRET_FETCH_TIMEOUT_SECS: &str = "SECRET_FETCH_TIMEOUT_SECS";
pub const ENV_PORT: &str = "PORT";
pub const ENV_NODE_ENV: &str = "NODE_ENV";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_JWT_EXPIRES_IN: &str = "JWT_EXPIRES_IN";
pub const ENV_TELEMETRY_CONNECTION_STRING: &str = "TELEMETRY_CONNECTION_STRING";
