//! Configuration resolution.
//!
//! [`ConfigResolver`] owns the current [`ConfigSnapshot`]. It is constructed
//! once at startup and shared as `Arc<ConfigResolver>` with everything that
//! reads configuration.
//!
//! ```text
//! Uninitialized -> Initializing -> Ready
//!                              \-> FallbackReady
//! ```
//!
//! Initialization never fails: backend errors degrade to a snapshot built
//! from environment variables.

pub mod health;
pub mod snapshot;

pub use health::{HealthProbe, HealthResult, HealthStatus};
pub use snapshot::{ConfigSnapshot, RedactedSnapshot, ResolverState, SecurityInfo};

use crate::config::{ResolutionMode, Settings, ENV_BACKEND_LABEL, FALLBACK_BACKEND_LABEL};
use crate::error::{Error, Result};
use crate::secrets::{SecretProvider, SecretSource};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

struct Current {
    state: ResolverState,
    snapshot: Option<Arc<ConfigSnapshot>>,
}

pub struct ConfigResolver {
    settings: Settings,
    /// Injected backend; the HTTP source from `settings` is used when absent.
    source: Option<Arc<dyn SecretSource>>,
    provider: RwLock<Option<Arc<SecretProvider>>>,
    current: RwLock<Current>,
    /// Serializes initialize and refresh.
    lifecycle: Mutex<()>,
}

impl ConfigResolver {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            source: None,
            provider: RwLock::new(None),
            current: RwLock::new(Current {
                state: ResolverState::Uninitialized,
                snapshot: None,
            }),
            lifecycle: Mutex::new(()),
        }
    }

    /// Use `source` instead of the HTTP backend described by the settings.
    pub fn with_source(settings: Settings, source: Arc<dyn SecretSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::new(settings)
        }
    }

    pub fn mode(&self) -> ResolutionMode {
        self.settings.mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> ResolverState {
        self.current.read().state
    }

    /// Build the first snapshot. Always completes with a usable snapshot.
    ///
    /// Calling this again after it completed returns the current snapshot.
    pub async fn initialize(&self) -> Arc<ConfigSnapshot> {
        let _lifecycle = self.lifecycle.lock().await;

        let existing = self.current.read().snapshot.clone();
        if let Some(existing) = existing {
            debug!("Configuration already initialized");
            return existing;
        }

        self.current.write().state = ResolverState::Initializing;
        info!("Initializing configuration ({:?})", self.settings.mode);

        let (snapshot, state) = match self.settings.mode {
            ResolutionMode::EnvironmentBacked => (
                ConfigSnapshot::from_environment(&self.settings, ENV_BACKEND_LABEL),
                ResolverState::Ready,
            ),
            ResolutionMode::RemoteBacked => match self.initialize_remote().await {
                Ok(snapshot) => (snapshot, ResolverState::Ready),
                Err(e) => {
                    error!("Failed to initialize from secret backend: {}", e);
                    warn!("Falling back to environment variables");
                    (
                        ConfigSnapshot::from_environment(&self.settings, FALLBACK_BACKEND_LABEL),
                        ResolverState::FallbackReady,
                    )
                }
            },
        };

        let snapshot = Arc::new(snapshot);
        self.install(snapshot.clone(), state);
        info!(
            "Configuration initialized: backend={}, environment={}, state={:?}",
            snapshot.secret_backend_label, snapshot.environment, state
        );
        snapshot
    }

    async fn initialize_remote(&self) -> Result<ConfigSnapshot> {
        let provider = Arc::new(self.build_provider()?);
        // Keep the provider even if the first load fails so refresh can retry.
        *self.provider.write() = Some(provider.clone());

        let secrets = provider.get_all_secrets().await?;
        let database_url = provider.get_database_url().await?;
        Ok(ConfigSnapshot::from_secrets(
            &self.settings,
            &secrets,
            database_url,
            provider.label(),
        ))
    }

    fn build_provider(&self) -> Result<SecretProvider> {
        match &self.source {
            Some(source) => Ok(SecretProvider::new(
                source.clone(),
                self.settings.database_url.clone(),
            )
            .with_fetch_timeout(self.settings.backend.fetch_timeout)),
            None => SecretProvider::from_settings(&self.settings),
        }
    }

    /// The current snapshot. Fails until `initialize` has completed.
    pub fn get_config(&self) -> Result<Arc<ConfigSnapshot>> {
        self.current
            .read()
            .snapshot
            .clone()
            .ok_or(Error::NotInitialized("call initialize() before reading configuration"))
    }

    /// Drop cached secrets, reload them, and swap in a new snapshot.
    ///
    /// On failure the current snapshot stays in place.
    pub async fn refresh_secrets(&self) -> Result<Arc<ConfigSnapshot>> {
        let provider = self
            .provider()
            .ok_or(Error::NotInitialized("secret provider was never constructed"))?;
        let _lifecycle = self.lifecycle.lock().await;
        let previous = self.get_config()?;

        info!("Refreshing secrets from {}", provider.label());
        provider.clear_cache();

        let reloaded = async {
            let secrets = provider.get_all_secrets().await?;
            let database_url = provider.get_database_url().await?;
            Ok::<_, Error>((secrets, database_url))
        }
        .await;

        let (secrets, database_url) = reloaded.map_err(|e| {
            error!("Secret refresh failed, keeping current configuration: {}", e);
            e
        })?;

        let snapshot = Arc::new(previous.with_secrets(&secrets, database_url, provider.label()));
        self.install(snapshot.clone(), ResolverState::Ready);
        info!("Secrets refreshed successfully");
        Ok(snapshot)
    }

    /// Report backend health. Never fails.
    pub async fn health_check(&self) -> HealthResult {
        if let Some(provider) = self.provider() {
            return HealthProbe::new(provider).check().await;
        }

        let current = self.get_config().ok();
        let label = current
            .as_ref()
            .map(|s| s.secret_backend_label.as_str())
            .unwrap_or(ENV_BACKEND_LABEL);

        match (self.settings.mode, current.is_some()) {
            (_, false) => HealthResult::unhealthy(label, "configuration not initialized"),
            (ResolutionMode::EnvironmentBacked, true) => HealthResult::healthy(label),
            (ResolutionMode::RemoteBacked, true) => {
                HealthResult::unhealthy(label, "secret provider not initialized")
            }
        }
    }

    /// Non-sensitive summary of the active configuration.
    pub fn security_info(&self) -> Result<SecurityInfo> {
        let current = self.current.read();
        let snapshot = current
            .snapshot
            .as_ref()
            .ok_or(Error::NotInitialized("call initialize() before reading configuration"))?;
        Ok(SecurityInfo::from_snapshot(snapshot, current.state))
    }

    fn provider(&self) -> Option<Arc<SecretProvider>> {
        self.provider.read().clone()
    }

    fn install(&self, snapshot: Arc<ConfigSnapshot>, state: ResolverState) {
        let mut current = self.current.write();
        current.snapshot = Some(snapshot);
        current.state = state;
    }
}
