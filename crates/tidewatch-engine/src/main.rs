//! Tidewatch engine binary.
//!
//! Wires a world source to the snapshot collector, starts the Query
//! Service, and drives the collector once per frame until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tidewatch.yaml` (or `$TIDEWATCH_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the simulated world source
//! 4. Create the snapshot collector
//! 5. Start the Query Service, unless disabled
//! 6. Drive the collector until Ctrl-C
//! 7. Stop the Query Service

mod driver;
mod error;
mod simulated;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tidewatch_api::{AppState, QueryService, ServerConfig};
use tidewatch_core::collector::{CollectorHandle, SnapshotCollector};
use tidewatch_core::config::{ServerSection, TidewatchConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::simulated::{SimulatedWorld, SimulatedWorldConfig};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "tidewatch.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the Query Service
/// cannot bind its port.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report the
    //    outcome once it is.
    let config_path = config_path();
    let config_found = config_path.exists();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "tidewatch-engine starting");
    if config_found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        enabled = config.server.enabled,
        port = config.server.port,
        refresh_interval_secs = config.collector.refresh_interval_secs,
        frame_interval_ms = config.collector.frame_interval_ms,
        "Configuration resolved"
    );

    // 3. Create the world source.
    let world_config = load_world_config(&config_path)?;
    let world = SimulatedWorld::new(&world_config);
    info!(
        seed = world_config.seed,
        warmup_secs = world_config.warmup_secs,
        "Simulated world created"
    );

    // 4. Create the collector.
    let mut collector = SnapshotCollector::new(world, config.collector.refresh_interval_secs)
        .map_err(EngineError::from)?;

    // 5. Start the Query Service.
    let service = start_service(&config.server, collector.handle()).await?;

    // 6. Drive the collector until Ctrl-C.
    let frame_interval = Duration::from_millis(config.collector.frame_interval_ms);
    driver::run_driver(&mut collector, frame_interval, shutdown_signal()).await;

    // 7. Stop the Query Service.
    if let Some(service) = service {
        service.stop().await.map_err(EngineError::from)?;
    }

    info!("tidewatch-engine shutdown complete");
    Ok(())
}

/// Start the Query Service over `handle`, unless the server section
/// disables it.
async fn start_service(
    section: &ServerSection,
    handle: CollectorHandle,
) -> Result<Option<QueryService>, EngineError> {
    if !section.enabled {
        info!("Query service disabled by configuration");
        return Ok(None);
    }

    let state = Arc::new(AppState::new(Arc::new(handle)));
    let service = QueryService::start(&ServerConfig::from(section), state).await?;
    Ok(Some(service))
}

/// Resolve the configuration path from `$TIDEWATCH_CONFIG` or the default.
fn config_path() -> PathBuf {
    std::env::var_os("TIDEWATCH_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load, override and validate the main configuration.
fn load_config(path: &Path) -> Result<TidewatchConfig, EngineError> {
    let config = if path.exists() {
        TidewatchConfig::from_file(path)?
    } else {
        let mut config = TidewatchConfig::default();
        config.apply_env_overrides()?;
        config
    };
    config.validate()?;
    Ok(config)
}

/// Load the `simulated_world` section of the configuration file.
///
/// Missing file or missing section yields defaults.
fn load_world_config(path: &Path) -> Result<SimulatedWorldConfig, EngineError> {
    if !path.exists() {
        return Ok(SimulatedWorldConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
        source: e.into(),
    })?;
    if contents.trim().is_empty() {
        return Ok(SimulatedWorldConfig::default());
    }

    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Config {
        source: e.into(),
    })?;

    match raw.get("simulated_world") {
        Some(section) => serde_yml::from_value(section.clone()).map_err(|e| EngineError::Config {
            source: e.into(),
        }),
        None => Ok(SimulatedWorldConfig::default()),
    }
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use tidewatch_core::source::NotReadySource;

    use super::*;

    fn local_section(enabled: bool) -> ServerSection {
        ServerSection {
            enabled,
            host: "127.0.0.1".to_owned(),
            port: 0,
        }
    }

    fn handle() -> Option<CollectorHandle> {
        SnapshotCollector::new(NotReadySource::new(), 1.0)
            .ok()
            .map(|collector| collector.handle())
    }

    #[tokio::test]
    async fn disabled_server_is_never_started() -> Result<(), EngineError> {
        let Some(handle) = handle() else {
            return Ok(());
        };
        let service = start_service(&local_section(false), handle).await?;
        assert!(service.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn enabled_server_binds_and_stops() -> Result<(), EngineError> {
        let Some(handle) = handle() else {
            return Ok(());
        };
        let service = start_service(&local_section(true), handle).await?;
        assert!(service.as_ref().is_some_and(QueryService::is_running));
        assert!(service.as_ref().is_some_and(|s| s.local_addr().port() != 0));

        if let Some(service) = service {
            service.stop().await?;
        }
        Ok(())
    }
}
