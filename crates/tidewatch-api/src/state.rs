//! Shared application state for the Query Service.
//!
//! [`AppState`] holds the read side of the collector and the version
//! string reported by the liveness probe. Handlers only ever read from
//! it; the collector is the sole writer of what it exposes.

use std::sync::Arc;

use tidewatch_core::collector::SnapshotProvider;

/// Version reported by `GET /api/ping`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Read access to readiness and the latest snapshot.
    pub provider: Arc<dyn SnapshotProvider>,
    /// Version string returned by the liveness probe.
    pub version: String,
}

impl AppState {
    /// Create application state around a snapshot provider.
    pub fn new(provider: Arc<dyn SnapshotProvider>) -> Self {
        Self {
            provider,
            version: VERSION.to_owned(),
        }
    }

    /// Override the reported version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ready", &self.provider.is_ready())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
