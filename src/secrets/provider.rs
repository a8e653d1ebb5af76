//! Cache-first secret access on top of a [`SecretSource`].

use super::cache::SecretCache;
use super::database_url::splice_password;
use super::source::HttpSecretSource;
use super::types::{
    RequiredSecrets, SecretSource, DB_PASSWORD_NAME, JWT_SECRET_NAME,
    TELEMETRY_CONNECTION_STRING_NAME,
};
use crate::config::{Settings, DEFAULT_FETCH_TIMEOUT_SECS, SECRET_CACHE_TTL};
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Resolves secrets through the cache, falling through to the backend.
pub struct SecretProvider {
    source: Arc<dyn SecretSource>,
    cache: SecretCache,
    /// One lock per secret name so concurrent misses share a single fetch.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    fetch_timeout: Duration,
    database_url_template: Option<String>,
}

impl SecretProvider {
    pub fn new(source: Arc<dyn SecretSource>, database_url_template: Option<String>) -> Self {
        Self {
            source,
            cache: SecretCache::new(),
            in_flight: DashMap::new(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            database_url_template,
        }
    }

    /// Override the per-fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Build a provider backed by the HTTP source described in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = HttpSecretSource::from_settings(&settings.backend)?;
        info!("Using secret backend: {}", source.label());
        Ok(Self::new(Arc::new(source), settings.database_url.clone())
            .with_fetch_timeout(settings.backend.fetch_timeout))
    }

    pub fn label(&self) -> &str {
        self.source.label()
    }

    /// Get a secret, from cache when fresh, otherwise from the backend.
    pub async fn get_secret(&self, name: &str) -> Result<String> {
        if let Some(value) = self.cache.get(name) {
            debug!("Retrieved {} from cache", name);
            return Ok(value);
        }

        let lock = self
            .in_flight
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have filled the cache while we waited.
        if let Some(value) = self.cache.get(name) {
            debug!("Retrieved {} from cache after concurrent fetch", name);
            return Ok(value);
        }

        let value = self.fetch(name).await?;
        self.cache.put(name, value.clone(), SECRET_CACHE_TTL);
        debug!("Fetched and cached {}", name);
        Ok(value)
    }

    /// Load every required secret concurrently. Any failure fails the whole call.
    pub async fn get_all_secrets(&self) -> Result<RequiredSecrets> {
        let joined = tokio::try_join!(
            self.get_secret(JWT_SECRET_NAME),
            self.get_secret(DB_PASSWORD_NAME),
            self.get_secret(TELEMETRY_CONNECTION_STRING_NAME),
        );

        match joined {
            Ok((jwt_secret, db_password, telemetry_connection_string)) => {
                info!("All required secrets loaded from {}", self.label());
                Ok(RequiredSecrets {
                    jwt_secret,
                    db_password,
                    telemetry_connection_string,
                })
            }
            Err(e) => {
                error!("Failed to load required secrets from {}: {}", self.label(), e);
                Err(Error::SecretsUnavailable {
                    source: Box::new(e),
                })
            }
        }
    }

    /// Build the database URL by splicing the backend password into the
    /// `DATABASE_URL` template.
    pub async fn get_database_url(&self) -> Result<String> {
        let template = self
            .database_url_template
            .as_deref()
            .ok_or_else(|| Error::InvalidDatabaseUrl("DATABASE_URL is not set".into()))?;
        let password = self.get_secret(DB_PASSWORD_NAME).await?;
        splice_password(template, &password)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Secret cache cleared");
    }

    async fn fetch(&self, name: &str) -> Result<String> {
        debug!("Fetching {} from {}", name, self.label());
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch(name)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Fetching {} timed out after {:?}", name, self.fetch_timeout);
                Err(Error::source_unavailable(
                    name,
                    format!("timed out after {:?}", self.fetch_timeout),
                ))
            }
        }
    }
}
