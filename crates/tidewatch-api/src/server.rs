//! Query Service lifecycle management.
//!
//! [`QueryService::start`] binds the listener up front, so a port
//! conflict is reported to the caller instead of dying on a background
//! task, then serves on a Tokio task with graceful shutdown.
//! [`QueryService::stop`] signals shutdown and waits until the listener
//! has been released. Dropping a running service signals shutdown too.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the Query Service listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on. `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 63030,
        }
    }
}

impl From<&tidewatch_core::config::ServerSection> for ServerConfig {
    fn from(section: &tidewatch_core::config::ServerSection) -> Self {
        Self {
            host: section.host.clone(),
            port: section.port,
        }
    }
}

/// Errors that can occur when starting or running the Query Service.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),

    /// The serving task panicked or was cancelled.
    #[error("server task failed: {0}")]
    Join(String),
}

/// A running Query Service.
#[derive(Debug)]
pub struct QueryService {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
}

impl QueryService {
    /// Bind the listener and start serving on a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address is invalid or
    /// cannot be bound.
    pub async fn start(config: &ServerConfig, state: Arc<AppState>) -> Result<Self, ServerError> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

        let router = build_router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    // A dropped sender also means shut down.
                    let _ = shutdown_rx.await;
                })
                .await
                .map_err(|e| ServerError::Serve(format!("serve error: {e}")));
            if let Err(e) = &result {
                error!(error = %e, "Query service exited with error");
            }
            result
        });

        info!(addr = %local_addr, "Query service listening");
        info!("Access at: http://{local_addr}/api/state");

        Ok(Self {
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// The address actually bound (useful when started on port 0).
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the serving task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop serving and wait for the listener to be released.
    ///
    /// # Errors
    ///
    /// Returns the serving task's error, or [`ServerError::Join`] if the
    /// task panicked.
    pub async fn stop(mut self) -> Result<(), ServerError> {
        self.signal_shutdown();
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        let result = task
            .await
            .map_err(|e| ServerError::Join(e.to_string()))?;
        info!(addr = %self.local_addr, "Query service stopped");
        result
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The receiver is gone only if the task already exited.
            let _ = tx.send(());
        }
    }
}

impl Drop for QueryService {
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!(addr = %self.local_addr, "Query service dropped without stop, shutting down");
            self.signal_shutdown();
        }
    }
}
