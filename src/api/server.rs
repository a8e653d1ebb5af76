use crate::api::routes;
use crate::cli::ServeOpts;
use crate::resolver::ConfigResolver;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Shared state for the configuration API.
#[derive(Clone)]
pub struct ApiState {
    pub resolver: Arc<ConfigResolver>,
    pub start_time: std::time::Instant,
    pub version: String,
}

impl ApiState {
    pub fn new(resolver: Arc<ConfigResolver>) -> Self {
        Self {
            resolver,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// HTTP server exposing health, security info, and secret refresh.
pub struct ApiServer {
    state: ApiState,
    listener: TcpListener,
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ApiServer {
    /// Initialize configuration, then bind the listener.
    ///
    /// No port is opened before `initialize` has completed.
    pub async fn start(resolver: Arc<ConfigResolver>, opts: ServeOpts) -> Result<Self> {
        let snapshot = resolver.initialize().await;

        let port = opts.port.unwrap_or(snapshot.port);
        let addr: SocketAddr = format!("{}:{}", opts.bind, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", opts.bind, port))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Ok(Self {
            state: ApiState::new(resolver),
            listener,
            addr,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// The bound address, with the real port when started on port 0.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle that stops a running server.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let app = routes::build_routes(self.state.clone());

        info!(
            "expense-config v{} listening on {}",
            self.state.version, self.addr
        );
        info!("  Health: http://{}/api/health", self.addr);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal(self.shutdown_rx))
            .await?;

        info!("Server shut down gracefully");
        Ok(())
    }
}

/// Requests graceful shutdown of an [`ApiServer`].
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }
}

/// Wait for Ctrl+C, SIGTERM, or an explicit shutdown.
async fn shutdown_signal(mut shutdown_rx: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown requested");
        }
    }
}
